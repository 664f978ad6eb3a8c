//! The slide deck controller.
//!
//! [`SlideDeck`] owns the current position, the transition lock and the
//! per-slide activate/reset lifecycle. It is driven entirely by calls:
//! navigation requests from the input pump and [`SlideDeck::tick`] from the
//! frame loop. Deferred work (lock release, staggered reveals) lives in a
//! [`Scheduler`] so every outstanding continuation can be cancelled.
//!
//! A request is dropped, not queued, while a transition is running.

pub mod motion;
pub mod signals;
pub mod slide;

#[cfg(test)]
mod tests;

use std::time::Duration;

use tracing::{debug, trace};

use crate::input::Command;
use crate::schedule::{Scheduler, TaskHandle};

pub use motion::{GlowMotion, TrackMotion};
pub use signals::{DeckEvent, DeckSignals};
pub use slide::{Decorations, Slide, SlideKind, SlideSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    Idle { index: usize },
    Transitioning { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn between(from: usize, to: usize) -> Self {
        if to > from {
            Self::Forward
        } else {
            Self::Backward
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckTiming {
    /// How long a transition is assumed to take. The lock is released and
    /// the incoming cascade starts when it elapses.
    pub settle: Duration,
    pub stagger_step: Duration,
    /// Initial glow displacement in pixels, signed by direction.
    pub glow_offset: f32,
    pub glow_return: Duration,
    /// Fade time of a single word or tag.
    pub fade: Duration,
}

impl Default for DeckTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(720),
            stagger_step: Duration::from_millis(45),
            glow_offset: 80.0,
            glow_return: Duration::from_millis(1_200),
            fade: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: String,
    pub first_index: usize,
}

/// Distinct chapters of `slides` in order of first appearance.
pub fn chapters(slides: &[Slide]) -> Vec<Chapter> {
    let mut out: Vec<Chapter> = Vec::new();
    for slide in slides {
        if !out.iter().any(|c| c.id == slide.chapter_id) {
            out.push(Chapter {
                id: slide.chapter_id.clone(),
                first_index: slide.index,
            });
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeckTask {
    Settle { to: usize },
    RevealUnit { slide: usize, unit: usize },
}

#[derive(Debug)]
pub struct SlideDeck {
    slides: Vec<Slide>,
    state: DeckState,
    timing: DeckTiming,
    reduced_motion: bool,
    tasks: Scheduler<DeckTask>,
    settle: Option<TaskHandle>,
    reveals: Vec<Vec<TaskHandle>>,
    signals: DeckSignals,
    events: Vec<DeckEvent>,
    track: TrackMotion,
    glow: Vec<Option<GlowMotion>>,
    direction: Option<Direction>,
    torn_down: bool,
}

impl SlideDeck {
    /// Build a deck showing `start` (clamped) and play its cascade.
    pub fn new(
        slides: Vec<Slide>,
        timing: DeckTiming,
        reduced_motion: bool,
        start: usize,
        now: Duration,
    ) -> Self {
        let start = start.min(slides.len().saturating_sub(1));
        let signals = DeckSignals::compute(&slides, start);
        let n = slides.len();
        let mut deck = Self {
            slides,
            state: DeckState::Idle { index: start },
            timing,
            reduced_motion,
            tasks: Scheduler::new(),
            settle: None,
            reveals: vec![Vec::new(); n],
            signals,
            events: Vec::new(),
            track: TrackMotion::at_rest(start),
            glow: vec![None; n],
            direction: None,
            torn_down: false,
        };
        if n > 0 {
            deck.activate(start, now, None);
        }
        deck
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn state(&self) -> DeckState {
        self.state
    }

    /// The index the deck is at or heading to.
    pub fn current_index(&self) -> usize {
        match self.state {
            DeckState::Idle { index } => index,
            DeckState::Transitioning { to, .. } => to,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, DeckState::Transitioning { .. })
    }

    /// Direction of the most recent accepted transition.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn signals(&self) -> &DeckSignals {
        &self.signals
    }

    pub fn timing(&self) -> &DeckTiming {
        &self.timing
    }

    pub fn chapters(&self) -> Vec<Chapter> {
        chapters(&self.slides)
    }

    pub fn first_index_of(&self, chapter: &str) -> Option<usize> {
        self.slides
            .iter()
            .find(|s| s.chapter_id == chapter)
            .map(|s| s.index)
    }

    pub fn track_position(&self, now: Duration) -> f32 {
        self.track.position(now)
    }

    pub fn glow_offset(&self, index: usize, now: Duration) -> f32 {
        self.glow
            .get(index)
            .copied()
            .flatten()
            .map_or(0.0, |g| g.offset_at(now))
    }

    /// Drain pending activation notifications.
    pub fn take_events(&mut self) -> Vec<DeckEvent> {
        std::mem::take(&mut self.events)
    }

    /// When the deck next needs a tick, if ever.
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.tasks.next_due()
    }

    /// Whether anything is still moving at `now`.
    pub fn is_animating(&self, now: Duration) -> bool {
        let fade_tail = self.slides.get(self.current_index()).is_some_and(|s| {
            s.units.iter().enumerate().any(|(i, u)| {
                !u.is_revealed() || u.progress(now, s.unit_fade(i, self.timing.fade)) < 1.0
            })
        });
        !self.tasks.is_empty()
            || !self.track.is_settled(now)
            || self.glow.iter().flatten().any(|g| !g.is_at_rest(now))
            || fade_tail
    }

    pub fn apply(&mut self, command: Command, now: Duration) -> bool {
        match command {
            Command::Next => self.request_next(now),
            Command::Previous => self.request_previous(now),
            Command::GoTo(target) => self.request_go_to(target, now),
        }
    }

    pub fn request_next(&mut self, now: Duration) -> bool {
        self.request_go_to(self.current_index() + 1, now)
    }

    pub fn request_previous(&mut self, now: Duration) -> bool {
        match self.current_index().checked_sub(1) {
            Some(target) => self.request_go_to(target, now),
            None => false,
        }
    }

    /// Start a transition to `target`. Returns false (and changes nothing)
    /// while transitioning, for an out-of-range target, or for the current
    /// slide.
    pub fn request_go_to(&mut self, target: usize, now: Duration) -> bool {
        if self.torn_down {
            return false;
        }
        let DeckState::Idle { index: from } = self.state else {
            debug!(target, "navigation dropped: transition in progress");
            return false;
        };
        if target >= self.slides.len() || target == from {
            trace!(target, from, "navigation ignored");
            return false;
        }

        let direction = Direction::between(from, target);
        self.state = DeckState::Transitioning { from, to: target };
        self.direction = Some(direction);
        self.deactivate(from);
        self.signals = DeckSignals::compute(&self.slides, target);
        debug!(from, to = target, ?direction, "transition started");

        if self.reduced_motion {
            self.track = TrackMotion::at_rest(target);
            self.state = DeckState::Idle { index: target };
            self.activate(target, now, Some(direction));
            return true;
        }

        self.track = TrackMotion {
            from,
            to: target,
            started: now,
            duration: self.timing.settle,
        };
        let handle = self
            .tasks
            .schedule(now, self.timing.settle, DeckTask::Settle { to: target });
        self.settle = Some(handle);
        self.check_lock();
        true
    }

    /// Run every continuation due at `now`.
    pub fn tick(&mut self, now: Duration) {
        if self.torn_down {
            return;
        }
        for task in self.tasks.drain_due(now) {
            match task {
                DeckTask::Settle { to } => {
                    self.settle = None;
                    self.state = DeckState::Idle { index: to };
                    debug!(index = to, "transition settled");
                    self.activate(to, now, self.direction);
                }
                DeckTask::RevealUnit { slide, unit } => {
                    if self.current_index() != slide {
                        continue;
                    }
                    if let Some(u) = self.slides[slide].units.get_mut(unit) {
                        u.reveal(now);
                    }
                }
            }
        }
        self.check_lock();
    }

    /// Cancel every outstanding continuation. The deck ignores all further
    /// requests and ticks.
    pub fn teardown(&mut self) -> usize {
        self.torn_down = true;
        self.settle = None;
        for handles in &mut self.reveals {
            handles.clear();
        }
        let cancelled = self.tasks.cancel_all();
        debug!(cancelled, "deck torn down");
        cancelled
    }

    fn activate(&mut self, index: usize, now: Duration, direction: Option<Direction>) {
        self.events.push(DeckEvent::SlideActivated(index));
        self.glow[index] = match direction {
            Some(d) if !self.reduced_motion => Some(GlowMotion {
                offset: d.sign() * self.timing.glow_offset,
                started: now,
                duration: self.timing.glow_return,
            }),
            _ => None,
        };

        let reduced = self.reduced_motion;
        let slide = &mut self.slides[index];
        for (i, unit) in slide.units.iter_mut().enumerate() {
            if reduced || unit.stagger_delay.is_zero() {
                unit.reveal(now);
            } else {
                let handle = self.tasks.schedule(
                    now,
                    unit.stagger_delay,
                    DeckTask::RevealUnit {
                        slide: index,
                        unit: i,
                    },
                );
                self.reveals[index].push(handle);
            }
        }
    }

    fn deactivate(&mut self, index: usize) {
        for handle in self.reveals[index].drain(..) {
            self.tasks.cancel(handle);
        }
        for unit in &mut self.slides[index].units {
            unit.reset();
        }
        self.glow[index] = None;
        self.events.push(DeckEvent::SlideDeactivated(index));
    }

    /// A transition without a pending settle task would never release the
    /// lock and navigation would be frozen for good.
    fn check_lock(&self) {
        if let DeckState::Transitioning { from, to } = self.state {
            let alive = self.settle.is_some_and(|h| self.tasks.is_pending(h));
            assert!(alive, "transition lock leaked ({from} -> {to})");
        }
    }
}
