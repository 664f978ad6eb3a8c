pub mod backdrop;
pub mod chrome;
pub mod decorations;
pub mod text;

use std::time::Duration;

use eframe::egui;

use crate::deck::motion::ease_out_cubic;
use crate::deck::{Slide, SlideDeck};
use crate::schedule::steps;
use crate::scroll::ScrollPage;
use crate::theme::Theme;

/// Per-unit reveal progress for painting, in `[0, 1]`.
///
/// `unit` indexes [`Slide::units`]: words by ordinal, then diamond paths,
/// orbit tags and connectors.
pub trait RevealSource {
    fn unit_progress(&self, slide: usize, unit: usize) -> f32;
}

/// Reveal progress on the slide deck: every unit carries its own reveal
/// time.
pub struct DeckReveal<'a> {
    pub deck: &'a SlideDeck,
    pub now: Duration,
}

impl RevealSource for DeckReveal<'_> {
    fn unit_progress(&self, slide: usize, unit: usize) -> f32 {
        let Some(s) = self.deck.slide(slide) else {
            return 0.0;
        };
        s.units.get(unit).map_or(0.0, |u| {
            u.progress(self.now, s.unit_fade(unit, self.deck.timing().fade))
        })
    }
}

/// Reveal progress on the scrolling page: units are revealed per block, and
/// words inside a block cascade from the block's reveal time.
pub struct PageReveal<'a> {
    pub page: &'a ScrollPage,
    pub now: Duration,
    pub fade: Duration,
    pub stagger_step: Duration,
}

fn delayed_progress(revealed_at: Option<Duration>, delay: Duration, fade: Duration, now: Duration) -> f32 {
    let Some(at) = revealed_at else {
        return 0.0;
    };
    let start = at + delay;
    if now < start {
        return 0.0;
    }
    if fade.is_zero() {
        return 1.0;
    }
    ((now - start).as_secs_f32() / fade.as_secs_f32()).clamp(0.0, 1.0)
}

impl RevealSource for PageReveal<'_> {
    fn unit_progress(&self, slide: usize, unit: usize) -> f32 {
        let Some(s) = self.page.slides().get(slide) else {
            return 0.0;
        };
        if unit < s.word_count() {
            let block = self.page.block_of_word(slide, unit);
            let first = self.page.block_first_word(slide, block);
            let delay = steps(self.stagger_step, unit - first);
            let at = self.page.block_unit(slide, block).and_then(|u| u.revealed_at());
            delayed_progress(at, delay, self.fade, self.now)
        } else {
            let at = self.page.decoration_unit(slide).and_then(|u| u.revealed_at());
            let delay = s.units.get(unit).map_or(Duration::ZERO, |u| u.stagger_delay);
            delayed_progress(at, delay, s.unit_fade(unit, self.fade), self.now)
        }
    }
}

/// Paint one slide (content plus decorations) into `rect`. Decorations are
/// shifted down by `parallax`. Returns the screen rects of the content
/// blocks.
pub fn render_slide(
    painter: &egui::Painter,
    slide: &Slide,
    theme: &Theme,
    rect: egui::Rect,
    scale: f32,
    parallax: f32,
    reveal: &dyn RevealSource,
) -> Vec<egui::Rect> {
    let theme = theme.for_slide(slide.light);
    if slide.light {
        painter.rect_filled(rect, 0.0, theme.background);
    }
    let deco_rect = rect.translate(egui::vec2(0.0, parallax));
    decorations::draw(painter, slide, &theme, deco_rect, scale, reveal);
    let alpha = |ordinal: usize| ease_out_cubic(reveal.unit_progress(slide.index, ordinal));
    text::draw_content(painter, &slide.content, slide.kind, &theme, rect, scale, &alpha)
}

/// Content scale relative to a 1920×1080 reference frame.
pub fn scale_for(size: egui::Vec2) -> f32 {
    (size.x / 1920.0).min(size.y / 1080.0).max(0.2)
}
