use serde::Serialize;
use tracing::{debug, warn};

/// Candidate region of the source video suggested by highlight detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSegment {
    pub id: String,
    pub start: String,
    pub end: String,
    pub description: String,
    pub confidence: f64,
    pub selected: bool,
}

impl HighlightSegment {
    pub fn new(
        id: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
        selected: bool,
    ) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            end: end.into(),
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            selected,
        }
    }

    /// Confidence rounded to a whole percentage for display.
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence * 100.0).round() as u8
    }
}

/// Number of leading segments used when nothing is selected.
const FALLBACK_SEGMENT_COUNT: usize = 2;

/// Ordered set of highlight candidates and their selection flags.
///
/// The set is fixed for the lifetime of the registry; only the `selected`
/// flags change.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRegistry {
    segments: Vec<HighlightSegment>,
}

impl HighlightRegistry {
    /// Builds a registry from segments in display order.
    ///
    /// Segments whose id repeats an earlier one are dropped.
    pub fn new(segments: Vec<HighlightSegment>) -> Self {
        let mut unique: Vec<HighlightSegment> = Vec::with_capacity(segments.len());
        for segment in segments {
            if unique.iter().any(|existing| existing.id == segment.id) {
                warn!(segment_id = %segment.id, "duplicate highlight id dropped");
                continue;
            }
            unique.push(segment);
        }
        Self { segments: unique }
    }

    /// Registry seeded with the built-in detection results.
    pub fn seeded() -> Self {
        Self::new(vec![
            HighlightSegment::new(
                "segment-1",
                "00:18",
                "00:33",
                "High-energy hook and channel intro",
                0.94,
                true,
            ),
            HighlightSegment::new(
                "segment-2",
                "02:11",
                "02:38",
                "Key insight with strong visual moment",
                0.88,
                true,
            ),
            HighlightSegment::new(
                "segment-3",
                "05:46",
                "06:05",
                "Audience reaction with emotional peak",
                0.81,
                false,
            ),
            HighlightSegment::new(
                "segment-4",
                "08:19",
                "08:44",
                "Climactic reveal and CTA",
                0.9,
                true,
            ),
        ])
    }

    pub fn segments(&self) -> &[HighlightSegment] {
        &self.segments
    }

    pub fn get(&self, id: &str) -> Option<&HighlightSegment> {
        self.segments.iter().find(|segment| segment.id == id)
    }

    /// Flips the selection flag of `id`.
    ///
    /// Returns the new flag, or `None` when no segment has that id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let Some(segment) = self.segments.iter_mut().find(|segment| segment.id == id) else {
            debug!(segment_id = id, "toggle ignored: unknown highlight");
            return None;
        };
        segment.selected = !segment.selected;
        Some(segment.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.segments.iter().filter(|segment| segment.selected).count()
    }

    /// Selected segments in registry order, or the first two segments when
    /// none are selected.
    pub fn selected_or_fallback(&self) -> Vec<HighlightSegment> {
        let selected: Vec<HighlightSegment> = self
            .segments
            .iter()
            .filter(|segment| segment.selected)
            .cloned()
            .collect();
        if !selected.is_empty() {
            return selected;
        }

        self.segments
            .iter()
            .take(FALLBACK_SEGMENT_COUNT)
            .cloned()
            .collect()
    }
}

impl Default for HighlightRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::{HighlightRegistry, HighlightSegment};

    fn ids(segments: &[HighlightSegment]) -> Vec<&str> {
        segments.iter().map(|segment| segment.id.as_str()).collect()
    }

    #[test]
    fn seeded_registry_selects_three_segments_in_registry_order() {
        let registry = HighlightRegistry::seeded();

        assert_eq!(registry.selected_count(), 3);
        assert_eq!(
            ids(&registry.selected_or_fallback()),
            vec!["segment-1", "segment-2", "segment-4"]
        );
    }

    #[test]
    fn empty_selection_falls_back_to_first_two_segments() {
        let mut registry = HighlightRegistry::seeded();
        for id in ["segment-1", "segment-2", "segment-4"] {
            assert_eq!(registry.toggle(id), Some(false));
        }

        assert_eq!(registry.selected_count(), 0);
        assert_eq!(
            ids(&registry.selected_or_fallback()),
            vec!["segment-1", "segment-2"]
        );
    }

    #[test]
    fn fallback_keeps_registry_order_not_confidence_order() {
        let registry = HighlightRegistry::new(vec![
            HighlightSegment::new("low", "00:01", "00:05", "low", 0.2, false),
            HighlightSegment::new("high", "00:06", "00:09", "high", 0.99, false),
            HighlightSegment::new("mid", "00:10", "00:12", "mid", 0.5, false),
        ]);

        assert_eq!(ids(&registry.selected_or_fallback()), vec!["low", "high"]);
    }

    #[test]
    fn toggle_unknown_id_is_a_no_op() {
        let mut registry = HighlightRegistry::seeded();
        let before = registry.clone();

        assert_eq!(registry.toggle("segment-99"), None);
        assert_eq!(registry, before);
    }

    #[test]
    fn duplicate_ids_are_dropped() {
        let registry = HighlightRegistry::new(vec![
            HighlightSegment::new("a", "00:01", "00:02", "first", 0.5, true),
            HighlightSegment::new("a", "00:03", "00:04", "second", 0.5, true),
        ]);

        assert_eq!(registry.segments().len(), 1);
        assert_eq!(registry.segments()[0].description, "first");
    }

    #[test]
    fn confidence_percent_rounds_to_whole_number() {
        let registry = HighlightRegistry::seeded();
        let segment = registry.get("segment-2").expect("seeded segment");
        assert_eq!(segment.confidence_percent(), 88);
    }
}
