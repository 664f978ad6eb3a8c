//! Reveal state for animatable units and the viewport-driven scheduler.
//!
//! Two invalidation policies exist and are kept apart:
//! - [`ScrollRevealer`] reveals a unit once when it scrolls into view and
//!   never hides it again unless explicitly [`reset`](ScrollRevealer::reset).
//! - The slide deck resets every unit of a slide when the slide is left and
//!   replays the cascade on re-entry (see `deck`).

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::schedule::{Scheduler, TaskHandle};

pub type UnitId = usize;

/// Upper bound of the position-derived cascade delay.
pub const MAX_CASCADE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    Word,
    Path,
    Tag,
    Connector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimatableUnit {
    pub kind: UnitKind,
    pub stagger_delay: Duration,
    revealed_at: Option<Duration>,
}

impl AnimatableUnit {
    pub fn new(kind: UnitKind, stagger_delay: Duration) -> Self {
        Self {
            kind,
            stagger_delay,
            revealed_at: None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed_at.is_some()
    }

    pub fn revealed_at(&self) -> Option<Duration> {
        self.revealed_at
    }

    /// Mark revealed. Returns false if the unit was already revealed.
    pub fn reveal(&mut self, now: Duration) -> bool {
        if self.revealed_at.is_some() {
            return false;
        }
        self.revealed_at = Some(now);
        true
    }

    /// Back to the pre-reveal state.
    pub fn reset(&mut self) {
        self.revealed_at = None;
    }

    /// Fade progress in `[0, 1]`; `1.0` once `fade` has elapsed since the
    /// reveal, `0.0` while hidden.
    pub fn progress(&self, now: Duration, fade: Duration) -> f32 {
        match self.revealed_at {
            None => 0.0,
            Some(_) if fade.is_zero() => 1.0,
            Some(at) => {
                let elapsed = now.saturating_sub(at).as_secs_f32();
                (elapsed / fade.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }
}

/// Delay for a unit entering the viewport `top` pixels below its top edge,
/// so a cluster entering together cascades downward.
pub fn cascade_delay(top: f32, viewport_height: f32) -> Duration {
    if viewport_height <= 0.0 {
        return Duration::ZERO;
    }
    let ms = (top / viewport_height * 100.0).max(0.0);
    Duration::from_micros((ms * 1000.0).round() as u64).min(MAX_CASCADE_DELAY)
}

/// A unit that crossed its visibility threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entered {
    pub unit: UnitId,
    /// Distance of the unit's top edge below the viewport top.
    pub top: f32,
}

/// One-shot visibility watches.
///
/// Each registration reports its unit at most once through
/// [`take_entered`](VisibilityWatcher::take_entered); observing again
/// re-arms it.
pub trait VisibilityWatcher {
    fn observe(&mut self, unit: UnitId, threshold: f32);
    fn unobserve(&mut self, unit: UnitId);
    fn take_entered(&mut self) -> Vec<Entered>;
}

/// Vertical extent of a unit in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub height: f32,
}

/// Watches units against a scrolled viewport. The bottom edge of the
/// viewport is pulled in by `bottom_margin` so units count as visible a
/// little after they peek in.
#[derive(Debug)]
pub struct GeometryWatcher {
    bounds: HashMap<UnitId, Bounds>,
    watches: HashMap<UnitId, f32>,
    viewport: Viewport,
    bottom_margin: f32,
    entered: Vec<Entered>,
}

impl GeometryWatcher {
    pub fn new(viewport: Viewport, bottom_margin: f32) -> Self {
        Self {
            bounds: HashMap::new(),
            watches: HashMap::new(),
            viewport,
            bottom_margin,
            entered: Vec::new(),
        }
    }

    pub fn set_bounds(&mut self, unit: UnitId, bounds: Bounds) {
        self.bounds.insert(unit, bounds);
        self.evaluate();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.evaluate();
    }

    fn visible_fraction(&self, b: Bounds) -> f32 {
        let view_top = self.viewport.scroll_top;
        let view_bottom = view_top + (self.viewport.height - self.bottom_margin).max(0.0);
        let overlap = (b.top + b.height).min(view_bottom) - b.top.max(view_top);
        if b.height <= 0.0 {
            return if b.top >= view_top && b.top <= view_bottom {
                1.0
            } else {
                0.0
            };
        }
        (overlap / b.height).clamp(0.0, 1.0)
    }

    fn evaluate(&mut self) {
        let mut fired = Vec::new();
        for (&unit, &threshold) in &self.watches {
            let Some(&b) = self.bounds.get(&unit) else {
                continue;
            };
            let fraction = self.visible_fraction(b);
            if fraction > 0.0 && fraction >= threshold {
                fired.push(Entered {
                    unit,
                    top: b.top - self.viewport.scroll_top,
                });
            }
        }
        fired.sort_by_key(|e| e.unit);
        for e in &fired {
            self.watches.remove(&e.unit);
        }
        self.entered.extend(fired);
    }
}

impl VisibilityWatcher for GeometryWatcher {
    fn observe(&mut self, unit: UnitId, threshold: f32) {
        self.watches.insert(unit, threshold.clamp(0.0, 1.0));
        self.evaluate();
    }

    fn unobserve(&mut self, unit: UnitId) {
        self.watches.remove(&unit);
    }

    fn take_entered(&mut self) -> Vec<Entered> {
        std::mem::take(&mut self.entered)
    }
}

/// Viewport-watch reveal mode used by the scrolling page.
#[derive(Debug)]
pub struct ScrollRevealer<W: VisibilityWatcher> {
    watcher: W,
    threshold: f32,
    units: Vec<AnimatableUnit>,
    thresholds: Vec<f32>,
    tasks: Scheduler<UnitId>,
    pending: HashMap<UnitId, TaskHandle>,
}

impl<W: VisibilityWatcher> ScrollRevealer<W> {
    pub fn new(watcher: W, threshold: f32) -> Self {
        Self {
            watcher,
            threshold,
            units: Vec::new(),
            thresholds: Vec::new(),
            tasks: Scheduler::new(),
            pending: HashMap::new(),
        }
    }

    /// Register a unit and start watching it at the default threshold.
    pub fn add_unit(&mut self, unit: AnimatableUnit) -> UnitId {
        self.add_unit_at(unit, self.threshold)
    }

    pub fn add_unit_at(&mut self, unit: AnimatableUnit, threshold: f32) -> UnitId {
        let id = self.units.len();
        self.units.push(unit);
        self.thresholds.push(threshold);
        self.watcher.observe(id, threshold);
        id
    }

    pub fn watcher_mut(&mut self) -> &mut W {
        &mut self.watcher
    }

    pub fn unit(&self, id: UnitId) -> Option<&AnimatableUnit> {
        self.units.get(id)
    }

    pub fn units(&self) -> &[AnimatableUnit] {
        &self.units
    }

    /// Collect entries from the watcher and schedule their reveals.
    pub fn poll(&mut self, now: Duration, viewport_height: f32) {
        for entered in self.watcher.take_entered() {
            self.watcher.unobserve(entered.unit);
            let Some(unit) = self.units.get(entered.unit) else {
                continue;
            };
            if unit.is_revealed() || self.pending.contains_key(&entered.unit) {
                continue;
            }
            let delay = cascade_delay(entered.top, viewport_height);
            let handle = self.tasks.schedule(now, delay, entered.unit);
            self.pending.insert(entered.unit, handle);
        }
    }

    /// Run due reveals. Returns the units revealed by this call.
    pub fn tick(&mut self, now: Duration) -> Vec<UnitId> {
        let mut revealed = Vec::new();
        for id in self.tasks.drain_due(now) {
            self.pending.remove(&id);
            let Some(unit) = self.units.get_mut(id) else {
                continue;
            };
            if unit.reveal(now) {
                tracing::trace!(unit = id, "scroll reveal");
                revealed.push(id);
            }
        }
        revealed
    }

    /// Undo a reveal and re-arm the watch so the unit can play again.
    pub fn reset(&mut self, id: UnitId) {
        if let Some(handle) = self.pending.remove(&id) {
            self.tasks.cancel(handle);
        }
        if let Some(unit) = self.units.get_mut(id) {
            unit.reset();
            self.watcher.observe(id, self.thresholds[id]);
        }
    }

    /// Reveal everything now and stop watching (reduced motion).
    pub fn reveal_all(&mut self, now: Duration) {
        self.tasks.cancel_all();
        self.pending.clear();
        for (id, unit) in self.units.iter_mut().enumerate() {
            unit.reveal(now);
            self.watcher.unobserve(id);
        }
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.next_due()
    }

    /// Cancel outstanding reveals.
    pub fn teardown(&mut self) -> usize {
        self.pending.clear();
        self.tasks.cancel_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Synchronous fake: the test decides which units enter.
    #[derive(Default)]
    struct FakeWatcher {
        watched: Vec<(UnitId, f32)>,
        entered: Vec<Entered>,
    }

    impl FakeWatcher {
        fn enter(&mut self, unit: UnitId, top: f32) {
            if self.watched.iter().any(|(u, _)| *u == unit) {
                self.entered.push(Entered { unit, top });
            }
        }
    }

    impl VisibilityWatcher for FakeWatcher {
        fn observe(&mut self, unit: UnitId, threshold: f32) {
            self.watched.push((unit, threshold));
        }

        fn unobserve(&mut self, unit: UnitId) {
            self.watched.retain(|(u, _)| *u != unit);
        }

        fn take_entered(&mut self) -> Vec<Entered> {
            std::mem::take(&mut self.entered)
        }
    }

    #[test]
    fn cascade_delay_is_clamped() {
        assert_eq!(cascade_delay(-50.0, 800.0), Duration::ZERO);
        assert_eq!(cascade_delay(400.0, 800.0), ms(50));
        assert_eq!(cascade_delay(4_000.0, 800.0), MAX_CASCADE_DELAY);
        assert_eq!(cascade_delay(10.0, 0.0), Duration::ZERO);
    }

    #[test]
    fn unit_reveals_once() {
        let mut u = AnimatableUnit::new(UnitKind::Word, ms(90));
        assert!(u.reveal(ms(10)));
        assert!(!u.reveal(ms(20)));
        assert_eq!(u.revealed_at(), Some(ms(10)));
        assert!((u.progress(ms(310), ms(600)) - 0.5).abs() < 1e-4);
        u.reset();
        assert!(!u.is_revealed());
        assert_eq!(u.progress(ms(310), ms(600)), 0.0);
    }

    #[test]
    fn entered_unit_is_revealed_after_cascade_delay() {
        let mut r = ScrollRevealer::new(FakeWatcher::default(), 0.1);
        let id = r.add_unit(AnimatableUnit::new(UnitKind::Word, Duration::ZERO));
        r.watcher_mut().enter(id, 400.0);
        r.poll(ms(0), 800.0);
        assert!(r.tick(ms(49)).is_empty());
        assert_eq!(r.tick(ms(50)), vec![id]);
        assert!(r.unit(id).is_some_and(AnimatableUnit::is_revealed));
    }

    #[test]
    fn watch_is_retired_after_entry() {
        let mut r = ScrollRevealer::new(FakeWatcher::default(), 0.1);
        let id = r.add_unit(AnimatableUnit::new(UnitKind::Tag, Duration::ZERO));
        r.watcher_mut().enter(id, 0.0);
        r.poll(ms(0), 800.0);
        r.tick(ms(0));
        // Second entry is not reported: the watch is gone.
        r.watcher_mut().enter(id, 0.0);
        r.poll(ms(10), 800.0);
        assert!(r.tick(ms(500)).is_empty());
    }

    #[test]
    fn reset_rearms_the_watch() {
        let mut r = ScrollRevealer::new(FakeWatcher::default(), 0.1);
        let id = r.add_unit(AnimatableUnit::new(UnitKind::Path, Duration::ZERO));
        r.watcher_mut().enter(id, 0.0);
        r.poll(ms(0), 800.0);
        r.tick(ms(0));
        r.reset(id);
        assert!(!r.unit(id).is_some_and(AnimatableUnit::is_revealed));
        r.watcher_mut().enter(id, 0.0);
        r.poll(ms(100), 800.0);
        assert_eq!(r.tick(ms(100)), vec![id]);
    }

    #[test]
    fn reset_cancels_pending_reveal() {
        let mut r = ScrollRevealer::new(FakeWatcher::default(), 0.1);
        let id = r.add_unit(AnimatableUnit::new(UnitKind::Word, Duration::ZERO));
        r.watcher_mut().enter(id, 800.0);
        r.poll(ms(0), 800.0);
        r.reset(id);
        assert!(r.tick(ms(1_000)).is_empty());
    }

    #[test]
    fn geometry_watcher_fires_once_past_threshold() {
        let mut w = GeometryWatcher::new(
            Viewport {
                scroll_top: 0.0,
                height: 800.0,
            },
            40.0,
        );
        w.set_bounds(0, Bounds {
            top: 1_000.0,
            height: 100.0,
        });
        w.observe(0, 0.1);
        assert!(w.take_entered().is_empty());

        // 5px inside the margin-adjusted viewport: below threshold.
        w.set_viewport(Viewport {
            scroll_top: 245.0,
            height: 800.0,
        });
        assert!(w.take_entered().is_empty());

        w.set_viewport(Viewport {
            scroll_top: 300.0,
            height: 800.0,
        });
        let entered = w.take_entered();
        assert_eq!(entered.len(), 1);
        assert_eq!(entered[0].top, 700.0);

        w.set_viewport(Viewport {
            scroll_top: 400.0,
            height: 800.0,
        });
        assert!(w.take_entered().is_empty());
    }

    #[test]
    fn geometry_watcher_reports_visible_units_on_observe() {
        let mut w = GeometryWatcher::new(
            Viewport {
                scroll_top: 0.0,
                height: 800.0,
            },
            40.0,
        );
        w.set_bounds(3, Bounds {
            top: 100.0,
            height: 50.0,
        });
        w.observe(3, 0.1);
        assert_eq!(w.take_entered().len(), 1);
    }

    #[test]
    fn reveal_all_reveals_everything() {
        let mut r = ScrollRevealer::new(FakeWatcher::default(), 0.1);
        r.add_unit(AnimatableUnit::new(UnitKind::Word, Duration::ZERO));
        r.add_unit(AnimatableUnit::new(UnitKind::Connector, Duration::ZERO));
        r.reveal_all(ms(5));
        assert!(r.units().iter().all(AnimatableUnit::is_revealed));
        assert!(r.watcher_mut().watched.is_empty());
    }
}
