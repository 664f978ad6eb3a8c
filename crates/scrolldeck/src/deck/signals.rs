use super::slide::Slide;

/// Notifications for decorative collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckEvent {
    SlideActivated(usize),
    SlideDeactivated(usize),
}

/// Position-derived UI state, recomputed synchronously on every accepted
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckSignals {
    pub index: usize,
    pub total: usize,
    /// 0–100.
    pub progress: f32,
    pub active_chapter: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl DeckSignals {
    pub fn compute(slides: &[Slide], index: usize) -> Self {
        let total = slides.len();
        let progress = if total > 1 {
            index as f32 / (total - 1) as f32 * 100.0
        } else {
            0.0
        };
        Self {
            index,
            total,
            progress,
            active_chapter: slides
                .get(index)
                .map(|s| s.chapter_id.clone())
                .unwrap_or_default(),
            prev_enabled: index > 0,
            next_enabled: index + 1 < total,
        }
    }

    /// 1-based `(current, total)`.
    pub fn counter(&self) -> (usize, usize) {
        (self.index + 1, self.total)
    }

    pub fn counter_label(&self) -> String {
        let (current, total) = self.counter();
        format!("{current:02}/{total:02}")
    }
}
