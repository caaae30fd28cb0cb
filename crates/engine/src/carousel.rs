use serde::Serialize;

/// Keys the carousel reacts to while it has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselKey {
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Whether a key press was consumed by the carousel.
///
/// `Handled` means the caller must suppress the key's default behavior
/// (scrolling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// Circular selection of the active short.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Carousel {
    active_index: usize,
    count: usize,
}

impl Carousel {
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Slots the track lays out; an empty carousel shows one placeholder.
    pub fn item_count(&self) -> usize {
        self.count.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Updates the number of shorts.
    ///
    /// The selection returns to the first short whenever shorts appear in an
    /// empty carousel, and is pulled back into range when the set shrinks.
    pub fn set_count(&mut self, count: usize) {
        let was_empty = self.count == 0;
        self.count = count;
        if count == 0 || was_empty {
            self.active_index = 0;
        } else if self.active_index >= count {
            self.active_index = count - 1;
        }
    }

    /// Replaces the short count and selects the first short.
    pub fn reset(&mut self, count: usize) {
        self.count = count;
        self.active_index = 0;
    }

    /// Returns the new index, or `None` when there is nothing to navigate.
    pub fn next(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        self.active_index = (self.active_index + 1) % self.count.max(1);
        Some(self.active_index)
    }

    /// Returns the new index, or `None` when there is nothing to navigate.
    pub fn previous(&mut self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        self.active_index = if self.active_index == 0 {
            self.count.saturating_sub(1)
        } else {
            self.active_index - 1
        };
        Some(self.active_index)
    }

    /// Applies keyboard navigation for a key pressed inside the carousel.
    pub fn handle_key(&mut self, key: CarouselKey) -> KeyOutcome {
        if self.count == 0 {
            return KeyOutcome::Ignored;
        }
        match key {
            CarouselKey::ArrowRight => {
                self.next();
                KeyOutcome::Handled
            }
            CarouselKey::ArrowLeft => {
                self.previous();
                KeyOutcome::Handled
            }
            CarouselKey::Other => KeyOutcome::Ignored,
        }
    }
}
