use serde::Serialize;

use crate::highlight::HighlightSegment;
use crate::options::ShortLength;

/// Thumbnail gradients assigned to shorts by position, cycling.
pub const GRADIENT_PALETTE: [&str; 4] = [
    "linear-gradient(145deg, rgba(255,64,129,0.85), rgba(58,12,163,0.88))",
    "linear-gradient(145deg, rgba(0,212,255,0.75), rgba(58,12,163,0.95))",
    "linear-gradient(145deg, rgba(255,167,38,0.8), rgba(255,64,129,0.85))",
    "linear-gradient(145deg, rgba(76,175,239,0.95), rgba(124,77,255,0.85))",
];

/// One clip produced by a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedShort {
    pub id: String,
    pub title: String,
    pub duration: u32,
    pub thumbnail_gradient: &'static str,
    pub clip_range: String,
    pub description: String,
}

/// Clip id derived from the id of its source segment.
pub fn short_id_for(segment_id: &str) -> String {
    format!("short-{segment_id}")
}

/// Builds the clip list for one run, one clip per segment in input order.
///
/// `segments` is expected to come from
/// [`HighlightRegistry::selected_or_fallback`](crate::highlight::HighlightRegistry::selected_or_fallback).
///
/// # Example
/// ```
/// use engine::{HighlightRegistry, ShortLength, synthesize};
///
/// let registry = HighlightRegistry::seeded();
/// let shorts = synthesize(&registry.selected_or_fallback(), ShortLength::Fifteen);
///
/// assert_eq!(shorts.len(), 3);
/// assert_eq!(shorts[2].id, "short-segment-4");
/// assert_eq!(shorts[2].title, "Highlight 3");
/// ```
pub fn synthesize(segments: &[HighlightSegment], length: ShortLength) -> Vec<GeneratedShort> {
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| GeneratedShort {
            id: short_id_for(&segment.id),
            title: format!("Highlight {}", index + 1),
            duration: length.seconds(),
            thumbnail_gradient: GRADIENT_PALETTE[index % GRADIENT_PALETTE.len()],
            clip_range: format!("{} - {}", segment.start, segment.end),
            description: segment.description.clone(),
        })
        .collect()
}
