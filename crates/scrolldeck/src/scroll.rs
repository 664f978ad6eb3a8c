//! The scrolling page variant: slides stacked vertically, each one viewport
//! high, revealed as they scroll into view.
//!
//! Every top-level block of a slide is one watched unit (threshold 0.1).
//! Decorations share a second unit per slide with a stricter threshold so
//! they only start drawing once the figure is mostly on screen.

use std::time::Duration;

use crate::content::ContentNode;
use crate::deck::Slide;
use crate::deck::motion::ease_out_cubic;
use crate::effects::ambient::{covers_band, scroll_fraction};
use crate::input::Key;
use crate::reveal::{
    AnimatableUnit, Bounds, GeometryWatcher, ScrollRevealer, UnitId, UnitKind, Viewport,
};

const BLOCK_THRESHOLD: f32 = 0.1;
const DECORATION_THRESHOLD: f32 = 0.3;
/// The viewport bottom is pulled in by this much when testing visibility.
const BOTTOM_MARGIN: f32 = 40.0;
/// The chapter nav appears once the page has scrolled this far, as a
/// fraction of the viewport height.
const NAV_REVEAL: f32 = 0.3;
const SMOOTH_SCROLL: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollAnimation {
    from: f32,
    to: f32,
    started: Duration,
}

#[derive(Debug)]
struct PageSlide {
    blocks: Vec<UnitId>,
    /// Ordinal of the first word in each block.
    block_first_word: Vec<usize>,
    decorations: Option<UnitId>,
}

#[derive(Debug)]
pub struct ScrollPage {
    slides: Vec<Slide>,
    page: Vec<PageSlide>,
    revealer: ScrollRevealer<GeometryWatcher>,
    scroll_top: f32,
    viewport_height: f32,
    animation: Option<ScrollAnimation>,
    reduced_motion: bool,
}

fn top_level_blocks(content: &ContentNode) -> Vec<&ContentNode> {
    match content {
        ContentNode::Element(el) if el.tag == crate::content::Tag::Fragment => {
            el.children.iter().collect()
        }
        other => vec![other],
    }
}

impl ScrollPage {
    pub fn new(slides: Vec<Slide>, viewport_height: f32, reduced_motion: bool, now: Duration) -> Self {
        let watcher = GeometryWatcher::new(
            Viewport {
                scroll_top: 0.0,
                height: viewport_height,
            },
            BOTTOM_MARGIN,
        );
        let mut revealer = ScrollRevealer::new(watcher, BLOCK_THRESHOLD);
        let mut page = Vec::with_capacity(slides.len());

        for slide in &slides {
            let mut blocks = Vec::new();
            let mut block_first_word = Vec::new();
            let mut first_word = 0;
            for block in top_level_blocks(&slide.content) {
                blocks.push(revealer.add_unit(AnimatableUnit::new(UnitKind::Word, Duration::ZERO)));
                block_first_word.push(first_word);
                first_word += block.word_count();
            }
            let d = &slide.decorations;
            let decorations = (d.diamond_paths > 0 || !d.orbit_tags.is_empty() || d.connectors > 0)
                .then(|| {
                    revealer.add_unit_at(
                        AnimatableUnit::new(UnitKind::Path, Duration::ZERO),
                        DECORATION_THRESHOLD,
                    )
                });
            page.push(PageSlide {
                blocks,
                block_first_word,
                decorations,
            });
        }

        let mut this = Self {
            slides,
            page,
            revealer,
            scroll_top: 0.0,
            viewport_height,
            animation: None,
            reduced_motion,
        };
        this.estimate_bounds();
        if reduced_motion {
            this.revealer.reveal_all(now);
        }
        this
    }

    /// Spread each slide's blocks over its middle band until the renderer
    /// reports real positions.
    fn estimate_bounds(&mut self) {
        let h = self.viewport_height;
        for (i, page) in self.page.iter().enumerate() {
            let slide_top = i as f32 * h;
            let n = page.blocks.len().max(1) as f32;
            let band = h * 0.6;
            for (b, &unit) in page.blocks.iter().enumerate() {
                self.revealer.watcher_mut().set_bounds(
                    unit,
                    Bounds {
                        top: slide_top + h * 0.2 + band * b as f32 / n,
                        height: band / n,
                    },
                );
            }
            if let Some(unit) = page.decorations {
                self.revealer.watcher_mut().set_bounds(
                    unit,
                    Bounds {
                        top: slide_top + h * 0.25,
                        height: h * 0.5,
                    },
                );
            }
        }
    }

    /// Record where a block actually landed (document coordinates).
    pub fn set_block_bounds(&mut self, slide: usize, block: usize, bounds: Bounds) {
        if let Some(&unit) = self.page.get(slide).and_then(|p| p.blocks.get(block)) {
            self.revealer.watcher_mut().set_bounds(unit, bounds);
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn document_height(&self) -> f32 {
        self.slides.len() as f32 * self.viewport_height
    }

    fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        if (height - self.viewport_height).abs() < 0.5 || height <= 0.0 {
            return;
        }
        let fraction = if self.viewport_height > 0.0 {
            self.scroll_top / self.viewport_height
        } else {
            0.0
        };
        self.viewport_height = height;
        self.scroll_top = (fraction * height).clamp(0.0, self.max_scroll());
        self.animation = None;
        self.estimate_bounds();
        self.sync_viewport();
    }

    fn sync_viewport(&mut self) {
        let viewport = Viewport {
            scroll_top: self.scroll_top,
            height: self.viewport_height,
        };
        self.revealer.watcher_mut().set_viewport(viewport);
    }

    pub fn scroll_by(&mut self, dy: f32) {
        self.animation = None;
        self.scroll_top = (self.scroll_top + dy).clamp(0.0, self.max_scroll());
        self.sync_viewport();
    }

    pub fn scroll_to_slide(&mut self, index: usize, now: Duration) {
        let Some(last) = self.slides.len().checked_sub(1) else {
            return;
        };
        let to = (index.min(last) as f32 * self.viewport_height).min(self.max_scroll());
        if self.reduced_motion {
            self.scroll_top = to;
            self.sync_viewport();
            return;
        }
        self.animation = Some(ScrollAnimation {
            from: self.scroll_top,
            to,
            started: now,
        });
    }

    /// The slide under the viewport's centre line.
    pub fn current_slide(&self) -> usize {
        let probe = self.scroll_top + self.viewport_height / 2.0;
        (0..self.slides.len())
            .rev()
            .find(|&i| i as f32 * self.viewport_height <= probe)
            .unwrap_or(0)
    }

    pub fn key(&mut self, key: Key, now: Duration) {
        let current = self.current_slide();
        let last = self.slides.len().saturating_sub(1);
        match key {
            Key::Down | Key::Right => self.scroll_to_slide((current + 1).min(last), now),
            Key::Up | Key::Left => self.scroll_to_slide(current.saturating_sub(1), now),
            Key::Home => self.scroll_to_slide(0, now),
            Key::End => self.scroll_to_slide(last, now),
            Key::Space => self.scroll_by(self.viewport_height * 0.9),
        }
    }

    /// Jump to a chapter's first slide. Jumping away from the current slide
    /// replays the target's reveal on arrival.
    pub fn nav_click(&mut self, chapter: &str, now: Duration) {
        let Some(index) = self.slides.iter().find(|s| s.chapter_id == chapter).map(|s| s.index) else {
            return;
        };
        if index != self.current_slide() && !self.reduced_motion {
            self.replay(index);
        }
        self.scroll_to_slide(index, now);
    }

    /// Advance smooth scrolling and run due reveals.
    pub fn tick(&mut self, now: Duration) {
        if let Some(anim) = self.animation {
            let t = now.saturating_sub(anim.started).as_secs_f32() / SMOOTH_SCROLL.as_secs_f32();
            let eased = ease_out_cubic(t);
            self.scroll_top = anim.from + (anim.to - anim.from) * eased;
            if t >= 1.0 {
                self.scroll_top = anim.to;
                self.animation = None;
            }
            self.sync_viewport();
        }
        self.revealer.poll(now, self.viewport_height);
        self.revealer.tick(now);
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.revealer.next_due().is_some()
    }

    /// 0–100.
    pub fn progress(&self) -> f32 {
        scroll_fraction(self.scroll_top, self.document_height(), self.viewport_height) * 100.0
    }

    pub fn nav_visible(&self) -> bool {
        self.scroll_top > self.viewport_height * NAV_REVEAL
    }

    /// The slide covering the middle 40 % band of the viewport.
    pub fn active_slide(&self) -> Option<&Slide> {
        self.slides.iter().find(|s| {
            let top = s.index as f32 * self.viewport_height - self.scroll_top;
            covers_band(top, top + self.viewport_height, self.viewport_height, 0.3, 0.7)
        })
    }

    pub fn active_chapter(&self) -> Option<&str> {
        self.active_slide().map(|s| s.chapter_id.as_str())
    }

    /// Whether a light section sits across the viewport middle.
    pub fn in_light(&self) -> bool {
        self.slides.iter().any(|s| {
            let top = s.index as f32 * self.viewport_height - self.scroll_top;
            s.light && covers_band(top, top + self.viewport_height, self.viewport_height, 0.4, 0.6)
        })
    }

    pub fn block_unit(&self, slide: usize, block: usize) -> Option<&AnimatableUnit> {
        let id = *self.page.get(slide)?.blocks.get(block)?;
        self.revealer.unit(id)
    }

    pub fn block_first_word(&self, slide: usize, block: usize) -> usize {
        self.page
            .get(slide)
            .and_then(|p| p.block_first_word.get(block).copied())
            .unwrap_or(0)
    }

    /// The block holding word `ordinal` of a slide.
    pub fn block_of_word(&self, slide: usize, ordinal: usize) -> usize {
        self.page.get(slide).map_or(0, |p| {
            p.block_first_word
                .iter()
                .rposition(|&first| first <= ordinal)
                .unwrap_or(0)
        })
    }

    pub fn decoration_unit(&self, slide: usize) -> Option<&AnimatableUnit> {
        let id = self.page.get(slide)?.decorations?;
        self.revealer.unit(id)
    }

    /// Hide a slide's units and re-arm their watches so the reveal plays
    /// again.
    pub fn replay(&mut self, slide: usize) {
        let Some(page) = self.page.get(slide) else {
            return;
        };
        let ids: Vec<UnitId> = page.blocks.iter().copied().chain(page.decorations).collect();
        for id in ids {
            self.revealer.reset(id);
        }
    }

    pub fn teardown(&mut self) -> usize {
        self.animation = None;
        self.revealer.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Tag;
    use crate::deck::{Decorations, SlideKind, SlideSource};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn slides(n: usize) -> Vec<Slide> {
        (0..n)
            .map(|i| {
                let source = SlideSource {
                    chapter_id: format!("c{}", i / 2),
                    light: i == 2,
                    kind: SlideKind::Content,
                    content: ContentNode::fragment(vec![
                        ContentNode::element(Tag::Heading(2), vec![ContentNode::text("Title here")]),
                        ContentNode::element(Tag::Paragraph, vec![ContentNode::text("body text")]),
                    ]),
                    decorations: Decorations {
                        diamond_paths: usize::from(i == 1) * 3,
                        ..Decorations::default()
                    },
                };
                Slide::prepare(i, source, Duration::from_millis(45))
            })
            .collect()
    }

    #[test]
    fn first_slide_reveals_on_load() {
        let mut page = ScrollPage::new(slides(4), 800.0, false, ms(0));
        page.tick(ms(0));
        page.tick(ms(200));
        assert!(page.block_unit(0, 0).is_some_and(AnimatableUnit::is_revealed));
        assert!(page.block_unit(0, 1).is_some_and(AnimatableUnit::is_revealed));
        assert!(!page.block_unit(1, 0).is_some_and(AnimatableUnit::is_revealed));
    }

    #[test]
    fn scrolling_reveals_the_next_slide_once() {
        let mut page = ScrollPage::new(slides(4), 800.0, false, ms(0));
        page.tick(ms(0));
        page.scroll_by(800.0);
        page.tick(ms(100));
        page.tick(ms(300));
        assert!(page.block_unit(1, 0).is_some_and(AnimatableUnit::is_revealed));
        assert!(page.decoration_unit(1).is_some_and(AnimatableUnit::is_revealed));
        let first = page.block_unit(1, 0).and_then(AnimatableUnit::revealed_at);

        // Scrolling away and back does not replay.
        page.scroll_by(-800.0);
        page.tick(ms(400));
        page.scroll_by(800.0);
        page.tick(ms(500));
        assert_eq!(page.block_unit(1, 0).and_then(AnimatableUnit::revealed_at), first);
    }

    #[test]
    fn replay_rearms_reveals() {
        let mut page = ScrollPage::new(slides(2), 800.0, false, ms(0));
        page.tick(ms(0));
        page.tick(ms(200));
        page.replay(0);
        assert!(!page.block_unit(0, 0).is_some_and(AnimatableUnit::is_revealed));
        page.tick(ms(300));
        page.tick(ms(500));
        assert!(page.block_unit(0, 0).is_some_and(AnimatableUnit::is_revealed));
    }

    #[test]
    fn keys_scroll_to_neighbouring_slides() {
        let mut page = ScrollPage::new(slides(4), 800.0, false, ms(0));
        page.key(Key::Down, ms(0));
        page.tick(ms(SMOOTH_SCROLL.as_millis() as u64));
        assert_eq!(page.scroll_top(), 800.0);
        assert_eq!(page.current_slide(), 1);
        page.key(Key::Up, ms(1_000));
        page.tick(ms(2_000));
        assert_eq!(page.current_slide(), 0);
        page.key(Key::End, ms(2_000));
        page.tick(ms(3_000));
        assert_eq!(page.current_slide(), 3);
        assert_eq!(page.progress(), 100.0);
    }

    #[test]
    fn nav_and_chapter_tracking() {
        let mut page = ScrollPage::new(slides(4), 800.0, false, ms(0));
        assert!(!page.nav_visible());
        assert_eq!(page.active_chapter(), Some("c0"));
        page.nav_click("c1", ms(0));
        page.tick(ms(1_000));
        assert!(page.nav_visible());
        assert_eq!(page.current_slide(), 2);
        assert_eq!(page.active_chapter(), Some("c1"));
        assert!(page.in_light());
    }

    #[test]
    fn chapter_jump_replays_the_target() {
        let mut page = ScrollPage::new(slides(4), 800.0, false, ms(0));
        page.tick(ms(0));
        page.tick(ms(200));
        let first = page.block_unit(0, 0).and_then(AnimatableUnit::revealed_at);
        assert!(first.is_some());

        page.nav_click("c1", ms(1_000));
        page.tick(ms(2_000));
        page.tick(ms(2_200));
        assert_eq!(page.current_slide(), 2);

        page.nav_click("c0", ms(3_000));
        assert!(!page.block_unit(0, 0).is_some_and(AnimatableUnit::is_revealed));
        page.tick(ms(4_000));
        page.tick(ms(4_200));
        let again = page.block_unit(0, 0).and_then(AnimatableUnit::revealed_at);
        assert!(again > first);

        // Clicking the chapter already on screen leaves it alone.
        page.nav_click("c0", ms(5_000));
        assert_eq!(page.block_unit(0, 0).and_then(AnimatableUnit::revealed_at), again);
    }

    #[test]
    fn reduced_motion_reveals_everything() {
        let page = ScrollPage::new(slides(3), 800.0, true, ms(0));
        assert!(page.block_unit(2, 1).is_some_and(AnimatableUnit::is_revealed));
        assert!(!page.is_animating());
    }

    #[test]
    fn word_to_block_mapping() {
        let page = ScrollPage::new(slides(1), 800.0, false, ms(0));
        assert_eq!(page.block_first_word(0, 1), 2);
        assert_eq!(page.block_of_word(0, 0), 0);
        assert_eq!(page.block_of_word(0, 1), 0);
        assert_eq!(page.block_of_word(0, 3), 1);
    }

    #[test]
    fn resize_keeps_relative_position() {
        let mut page = ScrollPage::new(slides(4), 800.0, false, ms(0));
        page.scroll_by(1_600.0);
        page.set_viewport_height(400.0);
        assert_eq!(page.scroll_top(), 800.0);
        assert_eq!(page.current_slide(), 2);
    }
}
