//! Input multiplexing.
//!
//! Five adapters (keyboard, swipe, wheel, arrow buttons, nav items) turn
//! raw device input into [`Command`]s and publish them on one channel. Each
//! adapter applies its own rate limit. A single [`CommandPump`] drains the
//! channel into the deck, which is the only place the transition lock is
//! checked.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::{trace, warn};

use crate::deck::{Chapter, SlideDeck};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    GoTo(usize),
}

/// Keys the deck consumes. Hosts must suppress their default scrolling for
/// every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Right,
    Down,
    Space,
    Left,
    Up,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowButton {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(Key),
    TouchStart { x: f32, y: f32 },
    TouchEnd { x: f32, y: f32 },
    Wheel { dx: f32, dy: f32 },
    Arrow(ArrowButton),
    NavClick(String),
}

/// What happened to one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent(Command),
    /// Recognised but inside the source's rate-limit window.
    Throttled,
    /// Not a navigation gesture.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSettings {
    pub key_interval: Duration,
    pub touch_interval: Duration,
    pub click_interval: Duration,
    pub wheel_cooldown: Duration,
    pub wheel_threshold: f32,
    pub swipe_threshold: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            key_interval: Duration::from_millis(150),
            touch_interval: Duration::from_millis(300),
            click_interval: Duration::from_millis(150),
            wheel_cooldown: Duration::from_millis(900),
            wheel_threshold: 20.0,
            swipe_threshold: 50.0,
        }
    }
}

/// Accepts at most one event per `min_interval`.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Option<Duration>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    pub fn allow(&mut self, now: Duration) -> bool {
        if self
            .last
            .is_some_and(|last| now.saturating_sub(last) < self.min_interval)
        {
            return false;
        }
        self.last = Some(now);
        true
    }
}

fn publish(tx: &Sender<Command>, command: Command) -> Dispatch {
    match tx.send(command) {
        Ok(()) => Dispatch::Sent(command),
        Err(_) => {
            warn!(?command, "command channel closed");
            Dispatch::Ignored
        }
    }
}

#[derive(Debug)]
pub struct KeyboardAdapter {
    tx: Sender<Command>,
    limiter: RateLimiter,
    slide_count: usize,
}

impl KeyboardAdapter {
    pub fn key(&mut self, key: Key, now: Duration) -> Dispatch {
        let command = match key {
            Key::Right | Key::Down | Key::Space => Command::Next,
            Key::Left | Key::Up => Command::Previous,
            Key::Home => Command::GoTo(0),
            Key::End => Command::GoTo(self.slide_count.saturating_sub(1)),
        };
        if !self.limiter.allow(now) {
            return Dispatch::Throttled;
        }
        publish(&self.tx, command)
    }
}

/// Recognises horizontal swipes. Mostly-vertical drags are left to the
/// host's own scrolling.
#[derive(Debug)]
pub struct SwipeAdapter {
    tx: Sender<Command>,
    limiter: RateLimiter,
    threshold: f32,
    origin: Option<(f32, f32)>,
}

impl SwipeAdapter {
    pub fn start(&mut self, x: f32, y: f32) {
        self.origin = Some((x, y));
    }

    pub fn end(&mut self, x: f32, y: f32, now: Duration) -> Dispatch {
        let Some((x0, y0)) = self.origin.take() else {
            return Dispatch::Ignored;
        };
        let dx = x - x0;
        let dy = y - y0;
        if dx.abs() <= self.threshold || dx.abs() <= dy.abs() {
            return Dispatch::Ignored;
        }
        if !self.limiter.allow(now) {
            return Dispatch::Throttled;
        }
        let command = if dx < 0.0 {
            Command::Next
        } else {
            Command::Previous
        };
        publish(&self.tx, command)
    }
}

/// Turns wheel deltas into steps. After every accepted step the wheel stays
/// quiet for the cooldown, whatever the deck is doing, so one long gesture
/// cannot queue a run of transitions.
#[derive(Debug)]
pub struct WheelAdapter {
    tx: Sender<Command>,
    cooldown: RateLimiter,
    threshold: f32,
}

impl WheelAdapter {
    pub fn wheel(&mut self, dx: f32, dy: f32, now: Duration) -> Dispatch {
        let delta = if dx.abs() > dy.abs() { dx } else { dy };
        if delta.abs() < self.threshold {
            return Dispatch::Ignored;
        }
        if !self.cooldown.allow(now) {
            return Dispatch::Throttled;
        }
        let command = if delta > 0.0 {
            Command::Next
        } else {
            Command::Previous
        };
        publish(&self.tx, command)
    }
}

#[derive(Debug)]
pub struct ArrowAdapter {
    tx: Sender<Command>,
    limiter: RateLimiter,
}

impl ArrowAdapter {
    pub fn click(&mut self, button: ArrowButton, now: Duration) -> Dispatch {
        if !self.limiter.allow(now) {
            return Dispatch::Throttled;
        }
        let command = match button {
            ArrowButton::Previous => Command::Previous,
            ArrowButton::Next => Command::Next,
        };
        publish(&self.tx, command)
    }
}

#[derive(Debug)]
pub struct NavAdapter {
    tx: Sender<Command>,
    limiter: RateLimiter,
    chapters: Vec<Chapter>,
}

impl NavAdapter {
    /// Jump to the first slide of `chapter`.
    pub fn click(&mut self, chapter: &str, now: Duration) -> Dispatch {
        let Some(target) = self
            .chapters
            .iter()
            .find(|c| c.id == chapter)
            .map(|c| c.first_index)
        else {
            return Dispatch::Ignored;
        };
        if !self.limiter.allow(now) {
            return Dispatch::Throttled;
        }
        publish(&self.tx, Command::GoTo(target))
    }
}

/// All five adapters behind one entry point.
#[derive(Debug)]
pub struct InputMultiplexer {
    pub keyboard: KeyboardAdapter,
    pub swipe: SwipeAdapter,
    pub wheel: WheelAdapter,
    pub arrows: ArrowAdapter,
    pub nav: NavAdapter,
}

impl InputMultiplexer {
    pub fn new(settings: InputSettings, slide_count: usize) -> (Self, Receiver<Command>) {
        let (tx, rx) = mpsc::channel();
        let mux = Self {
            keyboard: KeyboardAdapter {
                tx: tx.clone(),
                limiter: RateLimiter::new(settings.key_interval),
                slide_count,
            },
            swipe: SwipeAdapter {
                tx: tx.clone(),
                limiter: RateLimiter::new(settings.touch_interval),
                threshold: settings.swipe_threshold,
                origin: None,
            },
            wheel: WheelAdapter {
                tx: tx.clone(),
                cooldown: RateLimiter::new(settings.wheel_cooldown),
                threshold: settings.wheel_threshold,
            },
            arrows: ArrowAdapter {
                tx: tx.clone(),
                limiter: RateLimiter::new(settings.click_interval),
            },
            nav: NavAdapter {
                tx,
                limiter: RateLimiter::new(settings.click_interval),
                chapters: Vec::new(),
            },
        };
        (mux, rx)
    }

    pub fn set_slide_count(&mut self, slide_count: usize) {
        self.keyboard.slide_count = slide_count;
    }

    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        self.nav.chapters = chapters;
    }

    pub fn handle(&mut self, event: &InputEvent, now: Duration) -> Dispatch {
        let dispatch = match event {
            InputEvent::Key(key) => self.keyboard.key(*key, now),
            InputEvent::TouchStart { x, y } => {
                self.swipe.start(*x, *y);
                Dispatch::Ignored
            }
            InputEvent::TouchEnd { x, y } => self.swipe.end(*x, *y, now),
            InputEvent::Wheel { dx, dy } => self.wheel.wheel(*dx, *dy, now),
            InputEvent::Arrow(button) => self.arrows.click(*button, now),
            InputEvent::NavClick(chapter) => self.nav.click(chapter, now),
        };
        trace!(?event, ?dispatch, "input");
        dispatch
    }
}

/// The single consumer of the command channel.
#[derive(Debug)]
pub struct CommandPump {
    rx: Receiver<Command>,
}

impl CommandPump {
    pub fn new(rx: Receiver<Command>) -> Self {
        Self { rx }
    }

    /// Apply every queued command in order. Returns how many were received;
    /// the deck itself drops those that arrive mid-transition.
    pub fn drain(&self, deck: &mut SlideDeck, now: Duration) -> usize {
        let mut received = 0;
        for command in self.rx.try_iter() {
            received += 1;
            deck.apply(command, now);
        }
        received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn mux(slides: usize) -> (InputMultiplexer, Receiver<Command>) {
        InputMultiplexer::new(InputSettings::default(), slides)
    }

    #[test]
    fn keys_map_to_commands() {
        let (mut m, rx) = mux(7);
        let cases = [
            (Key::Right, Command::Next),
            (Key::Down, Command::Next),
            (Key::Space, Command::Next),
            (Key::Left, Command::Previous),
            (Key::Up, Command::Previous),
            (Key::Home, Command::GoTo(0)),
            (Key::End, Command::GoTo(6)),
        ];
        for (i, (key, expected)) in cases.into_iter().enumerate() {
            let now = ms(1_000 * i as u64);
            assert_eq!(m.handle(&InputEvent::Key(key), now), Dispatch::Sent(expected));
        }
        assert_eq!(rx.try_iter().count(), 7);
    }

    #[test]
    fn end_follows_a_reloaded_slide_count() {
        let (mut m, _rx) = mux(3);
        assert_eq!(
            m.handle(&InputEvent::Key(Key::End), ms(0)),
            Dispatch::Sent(Command::GoTo(2))
        );
        m.set_slide_count(9);
        assert_eq!(
            m.handle(&InputEvent::Key(Key::End), ms(1_000)),
            Dispatch::Sent(Command::GoTo(8))
        );
    }

    #[test]
    fn key_repeat_is_throttled() {
        let (mut m, rx) = mux(3);
        assert!(matches!(
            m.handle(&InputEvent::Key(Key::Right), ms(0)),
            Dispatch::Sent(_)
        ));
        assert_eq!(
            m.handle(&InputEvent::Key(Key::Right), ms(100)),
            Dispatch::Throttled
        );
        assert!(matches!(
            m.handle(&InputEvent::Key(Key::Right), ms(150)),
            Dispatch::Sent(_)
        ));
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn swipe_left_goes_forward() {
        let (mut m, _rx) = mux(3);
        m.handle(&InputEvent::TouchStart { x: 300.0, y: 100.0 }, ms(0));
        assert_eq!(
            m.handle(&InputEvent::TouchEnd { x: 200.0, y: 120.0 }, ms(50)),
            Dispatch::Sent(Command::Next)
        );
        m.handle(&InputEvent::TouchStart { x: 100.0, y: 100.0 }, ms(1_000));
        assert_eq!(
            m.handle(&InputEvent::TouchEnd { x: 200.0, y: 100.0 }, ms(1_050)),
            Dispatch::Sent(Command::Previous)
        );
    }

    #[test]
    fn short_or_vertical_swipes_are_ignored() {
        let (mut m, rx) = mux(3);
        m.handle(&InputEvent::TouchStart { x: 100.0, y: 100.0 }, ms(0));
        assert_eq!(
            m.handle(&InputEvent::TouchEnd { x: 60.0, y: 100.0 }, ms(10)),
            Dispatch::Ignored
        );
        m.handle(&InputEvent::TouchStart { x: 100.0, y: 100.0 }, ms(20));
        assert_eq!(
            m.handle(&InputEvent::TouchEnd { x: 20.0, y: 300.0 }, ms(30)),
            Dispatch::Ignored
        );
        // An end without a start.
        assert_eq!(
            m.handle(&InputEvent::TouchEnd { x: 0.0, y: 0.0 }, ms(40)),
            Dispatch::Ignored
        );
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn wheel_uses_dominant_axis() {
        let (mut m, _rx) = mux(3);
        assert_eq!(
            m.handle(&InputEvent::Wheel { dx: -40.0, dy: 10.0 }, ms(0)),
            Dispatch::Sent(Command::Previous)
        );
        assert_eq!(
            m.handle(&InputEvent::Wheel { dx: 5.0, dy: 10.0 }, ms(5_000)),
            Dispatch::Ignored
        );
        assert_eq!(
            m.handle(&InputEvent::Wheel { dx: 5.0, dy: 30.0 }, ms(5_000)),
            Dispatch::Sent(Command::Next)
        );
    }

    #[test]
    fn wheel_cooldown_applies_after_accepted_step() {
        let (mut m, _rx) = mux(3);
        let wheel = InputEvent::Wheel { dx: 0.0, dy: 50.0 };
        assert!(matches!(m.handle(&wheel, ms(0)), Dispatch::Sent(_)));
        assert_eq!(m.handle(&wheel, ms(899)), Dispatch::Throttled);
        assert!(matches!(m.handle(&wheel, ms(900)), Dispatch::Sent(_)));
    }

    #[test]
    fn clicks_map_one_to_one() {
        let (mut m, _rx) = mux(4);
        m.set_chapters(vec![
            Chapter {
                id: "intro".to_string(),
                first_index: 0,
            },
            Chapter {
                id: "method".to_string(),
                first_index: 2,
            },
        ]);
        assert_eq!(
            m.handle(&InputEvent::Arrow(ArrowButton::Next), ms(0)),
            Dispatch::Sent(Command::Next)
        );
        assert_eq!(
            m.handle(&InputEvent::Arrow(ArrowButton::Previous), ms(500)),
            Dispatch::Sent(Command::Previous)
        );
        assert_eq!(
            m.handle(&InputEvent::NavClick("method".to_string()), ms(0)),
            Dispatch::Sent(Command::GoTo(2))
        );
        assert_eq!(
            m.handle(&InputEvent::NavClick("unknown".to_string()), ms(1_000)),
            Dispatch::Ignored
        );
    }

    #[test]
    fn closed_channel_is_reported_as_ignored() {
        let (mut m, rx) = mux(3);
        drop(rx);
        assert_eq!(
            m.handle(&InputEvent::Key(Key::Right), ms(0)),
            Dispatch::Ignored
        );
    }

    #[test]
    fn rate_limiter_spacing() {
        let mut r = RateLimiter::new(ms(100));
        assert!(r.allow(ms(0)));
        assert!(!r.allow(ms(99)));
        assert!(r.allow(ms(100)));
        assert!(!r.allow(ms(150)));
    }
}
