use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::synth::GeneratedShort;

/// Step of the trim sliders in seconds.
pub const TRIM_STEP_SECS: u32 = 1;
/// Step of the sound level slider in percentage points.
pub const SOUND_LEVEL_STEP: u8 = 5;
/// Upper bound of the sound level.
pub const MAX_SOUND_LEVEL: u8 = 100;

/// Edit parameters of one generated short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingState {
    pub trim_start: u32,
    pub trim_end: u32,
    pub text_overlay: String,
    pub sound_level: u8,
}

impl EditingState {
    /// Untouched parameters for a short of `duration` seconds.
    pub fn defaults(duration: u32, sound_level: u8) -> Self {
        Self {
            trim_start: 0,
            trim_end: duration,
            text_overlay: String::new(),
            sound_level: sound_level.min(MAX_SOUND_LEVEL),
        }
    }
}

/// Partial edit: only the fields that are `Some` are written.
///
/// # Example
/// ```
/// use engine::EditingUpdate;
///
/// let update = EditingUpdate::default().trim_start(4).text_overlay("Wait for it");
/// assert_eq!(update.trim_start, Some(4));
/// assert_eq!(update.trim_end, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditingUpdate {
    pub trim_start: Option<u32>,
    pub trim_end: Option<u32>,
    pub text_overlay: Option<String>,
    pub sound_level: Option<u8>,
}

impl EditingUpdate {
    pub fn trim_start(mut self, seconds: u32) -> Self {
        self.trim_start = Some(seconds);
        self
    }

    pub fn trim_end(mut self, seconds: u32) -> Self {
        self.trim_end = Some(seconds);
        self
    }

    pub fn text_overlay(mut self, text: impl Into<String>) -> Self {
        self.text_overlay = Some(text.into());
        self
    }

    pub fn sound_level(mut self, level: u8) -> Self {
        self.sound_level = Some(level);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.trim_start.is_none()
            && self.trim_end.is_none()
            && self.text_overlay.is_none()
            && self.sound_level.is_none()
    }
}

/// Ranges offered by the trim controls for the current parameters.
///
/// Both ranges are inclusive and keep `min_span` seconds between start and
/// end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimBounds {
    pub start_min: u32,
    pub start_max: u32,
    pub end_min: u32,
    pub end_max: u32,
}

impl TrimBounds {
    pub fn for_state(state: &EditingState, duration: u32, min_span: u32) -> Self {
        Self {
            start_min: 0,
            start_max: state.trim_end.saturating_sub(min_span),
            end_min: state.trim_start.saturating_add(min_span).min(duration),
            end_max: duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClipEdit {
    duration: u32,
    state: EditingState,
}

/// Per-short edit parameters keyed by short id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingStore {
    min_trim_span: u32,
    default_sound_level: u8,
    entries: HashMap<String, ClipEdit>,
}

impl EditingStore {
    pub fn new(min_trim_span: u32, default_sound_level: u8) -> Self {
        Self {
            min_trim_span,
            default_sound_level: default_sound_level.min(MAX_SOUND_LEVEL),
            entries: HashMap::new(),
        }
    }

    pub fn min_trim_span(&self) -> u32 {
        self.min_trim_span
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, clip_id: &str) -> bool {
        self.entries.contains_key(clip_id)
    }

    pub fn get(&self, clip_id: &str) -> Option<&EditingState> {
        self.entries.get(clip_id).map(|entry| &entry.state)
    }

    /// Current parameters of `clip_id`, or the defaults for a short of
    /// `duration` seconds when it has none.
    pub fn get_or_default(&self, clip_id: &str, duration: u32) -> EditingState {
        self.get(clip_id)
            .cloned()
            .unwrap_or_else(|| EditingState::defaults(duration, self.default_sound_level))
    }

    /// Trim ranges currently offered for `clip_id`.
    pub fn bounds(&self, clip_id: &str) -> Option<TrimBounds> {
        let entry = self.entries.get(clip_id)?;
        Some(TrimBounds::for_state(
            &entry.state,
            entry.duration,
            self.min_trim_span,
        ))
    }

    /// Merges `update` into the parameters of `clip_id`.
    ///
    /// Trim values are clamped into the offered ranges and the sound level
    /// into `0..=100`. Returns `None` and leaves the store untouched when
    /// `clip_id` is unknown.
    pub fn update(&mut self, clip_id: &str, update: EditingUpdate) -> Option<&EditingState> {
        let min_span = self.min_trim_span;
        let Some(entry) = self.entries.get_mut(clip_id) else {
            debug!(clip_id, "editing update ignored: unknown short");
            return None;
        };
        let duration = entry.duration;
        let state = &mut entry.state;

        match (update.trim_start, update.trim_end) {
            (Some(start), Some(end)) => {
                state.trim_start = start.min(duration.saturating_sub(min_span));
                state.trim_end = clamp_end(end, state.trim_start, duration, min_span);
            }
            (Some(start), None) => {
                state.trim_start = start.min(state.trim_end.saturating_sub(min_span));
            }
            (None, Some(end)) => {
                state.trim_end = clamp_end(end, state.trim_start, duration, min_span);
            }
            (None, None) => {}
        }
        if let Some(text) = update.text_overlay {
            state.text_overlay = text;
        }
        if let Some(level) = update.sound_level {
            state.sound_level = level.min(MAX_SOUND_LEVEL);
        }

        Some(&entry.state)
    }

    /// Replaces every entry with defaults for `shorts`.
    pub fn reset_all<F>(&mut self, shorts: &[GeneratedShort], defaults: F)
    where
        F: Fn(&GeneratedShort) -> EditingState,
    {
        self.entries = shorts
            .iter()
            .map(|short| {
                (
                    short.id.clone(),
                    ClipEdit {
                        duration: short.duration,
                        state: defaults(short),
                    },
                )
            })
            .collect();
    }

    /// Replaces every entry with the store's own defaults for `shorts`.
    pub fn reset_for(&mut self, shorts: &[GeneratedShort]) {
        let sound_level = self.default_sound_level;
        self.reset_all(shorts, |short| {
            EditingState::defaults(short.duration, sound_level)
        });
    }
}

fn clamp_end(end: u32, trim_start: u32, duration: u32, min_span: u32) -> u32 {
    let lower = trim_start.saturating_add(min_span).min(duration);
    end.clamp(lower, duration)
}

#[cfg(test)]
mod tests {
    use super::{
        EditingState, EditingStore, EditingUpdate, MAX_SOUND_LEVEL, SOUND_LEVEL_STEP,
        TRIM_STEP_SECS, TrimBounds,
    };
    use crate::highlight::HighlightRegistry;
    use crate::options::ShortLength;
    use crate::synth::{GeneratedShort, synthesize};

    fn seeded_store(length: ShortLength) -> (EditingStore, Vec<GeneratedShort>) {
        let shorts = synthesize(
            &HighlightRegistry::seeded().selected_or_fallback(),
            length,
        );
        let mut store = EditingStore::new(3, 70);
        store.reset_for(&shorts);
        (store, shorts)
    }

    #[test]
    fn reset_seeds_one_default_entry_per_short() {
        let (store, shorts) = seeded_store(ShortLength::Thirty);

        assert_eq!(store.len(), shorts.len());
        for short in &shorts {
            assert_eq!(
                store.get(&short.id),
                Some(&EditingState {
                    trim_start: 0,
                    trim_end: 30,
                    text_overlay: String::new(),
                    sound_level: 70,
                })
            );
        }
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);

        store
            .update("short-segment-1", EditingUpdate::default().text_overlay("Hook!"))
            .expect("known short");
        let state = store
            .update("short-segment-1", EditingUpdate::default().sound_level(40))
            .expect("known short");

        assert_eq!(state.text_overlay, "Hook!");
        assert_eq!(state.sound_level, 40);
        assert_eq!(state.trim_start, 0);
        assert_eq!(state.trim_end, 30);
    }

    #[test]
    fn update_does_not_touch_other_shorts() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);
        let untouched = store.get("short-segment-2").cloned();

        store.update(
            "short-segment-1",
            EditingUpdate::default().trim_start(10).text_overlay("x"),
        );

        assert_eq!(store.get("short-segment-2").cloned(), untouched);
    }

    #[test]
    fn update_unknown_short_is_a_no_op() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);
        let before = store.clone();

        assert!(store.update("short-missing", EditingUpdate::default().sound_level(5)).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn get_or_default_falls_back_to_defaults() {
        let store = EditingStore::new(3, 70);

        assert_eq!(
            store.get_or_default("short-x", 15),
            EditingState::defaults(15, 70)
        );
    }

    #[test]
    fn trim_updates_keep_minimum_span_and_stay_within_duration() {
        let (mut store, _) = seeded_store(ShortLength::Fifteen);
        let id = "short-segment-1";
        let writes = [
            EditingUpdate::default().trim_start(14),
            EditingUpdate::default().trim_end(0),
            EditingUpdate::default().trim_end(99),
            EditingUpdate::default().trim_start(2).trim_end(3),
            EditingUpdate::default().trim_start(40).trim_end(41),
            EditingUpdate::default().trim_start(0),
            EditingUpdate::default().trim_end(4),
            EditingUpdate::default().trim_start(3),
        ];

        for write in writes {
            let state = store.update(id, write).expect("known short").clone();
            assert!(state.trim_end - state.trim_start >= 3, "{state:?}");
            assert!(state.trim_end <= 15, "{state:?}");
        }
    }

    #[test]
    fn trim_start_is_clamped_below_current_end() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);
        store.update("short-segment-1", EditingUpdate::default().trim_end(10));

        let state = store
            .update("short-segment-1", EditingUpdate::default().trim_start(25))
            .expect("known short");

        assert_eq!(state.trim_start, 7);
        assert_eq!(state.trim_end, 10);
    }

    #[test]
    fn bounds_track_the_opposite_handle() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);
        store.update(
            "short-segment-2",
            EditingUpdate::default().trim_start(5).trim_end(20),
        );

        assert_eq!(
            store.bounds("short-segment-2"),
            Some(TrimBounds {
                start_min: 0,
                start_max: 17,
                end_min: 8,
                end_max: 30,
            })
        );
        assert_eq!(store.bounds("short-missing"), None);
    }

    #[test]
    fn sound_level_is_clamped_to_one_hundred() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);

        let state = store
            .update("short-segment-4", EditingUpdate::default().sound_level(180))
            .expect("known short");

        assert_eq!(state.sound_level, 100);
    }

    #[test]
    fn slider_steps_land_on_defaults_and_bounds() {
        let (store, shorts) = seeded_store(ShortLength::Fifteen);
        let state = store.get(&shorts[0].id).expect("seeded entry");

        assert_eq!(MAX_SOUND_LEVEL % SOUND_LEVEL_STEP, 0);
        assert_eq!(state.sound_level % SOUND_LEVEL_STEP, 0);
        assert_eq!(state.trim_end % TRIM_STEP_SECS, 0);
        assert_eq!(store.min_trim_span() % TRIM_STEP_SECS, 0);
    }

    #[test]
    fn reset_all_drops_entries_of_previous_run() {
        let (mut store, _) = seeded_store(ShortLength::Thirty);
        let next = synthesize(
            &HighlightRegistry::seeded().selected_or_fallback()[..1],
            ShortLength::Sixty,
        );

        store.reset_all(&next, |short| EditingState {
            text_overlay: short.title.clone(),
            ..EditingState::defaults(short.duration, 50)
        });

        assert_eq!(store.len(), 1);
        assert!(!store.contains("short-segment-2"));
        let state = store.get("short-segment-1").expect("reseeded short");
        assert_eq!(state.trim_end, 60);
        assert_eq!(state.text_overlay, "Highlight 1");
    }
}
