use super::*;
use crate::deck::{DeckEvent, DeckState, Direction};
use crate::input::Command;

#[test]
fn go_to_locks_then_settles() {
    let mut d = deck(5);
    assert!(d.request_go_to(2, ms(100)));
    assert_eq!(d.state(), DeckState::Transitioning { from: 0, to: 2 });
    assert!(d.is_transitioning());

    d.tick(ms(100 + SETTLE - 1));
    assert!(d.is_transitioning());

    d.tick(ms(100 + SETTLE));
    assert_eq!(d.state(), DeckState::Idle { index: 2 });
    assert_eq!(d.direction(), Some(Direction::Forward));
}

#[test]
fn every_request_is_dropped_while_transitioning() {
    let mut d = deck(5);
    assert!(d.request_next(ms(0)));
    let before = d.state();
    for target in 0..6 {
        assert!(!d.request_go_to(target, ms(10)));
    }
    assert!(!d.request_next(ms(20)));
    assert!(!d.request_previous(ms(30)));
    assert!(!d.apply(Command::GoTo(4), ms(40)));
    assert_eq!(d.state(), before);

    // Dropped commands are gone, not queued.
    d.tick(ms(SETTLE));
    assert_eq!(d.state(), DeckState::Idle { index: 1 });
    d.tick(ms(10 * SETTLE));
    assert_eq!(d.state(), DeckState::Idle { index: 1 });
}

#[test]
fn invalid_targets_are_no_ops() {
    let mut d = deck(5);
    assert!(!d.request_go_to(0, ms(0)));
    assert!(!d.request_go_to(5, ms(0)));
    assert!(!d.request_go_to(usize::MAX, ms(0)));
    assert!(!d.request_previous(ms(0)));
    assert_eq!(d.state(), DeckState::Idle { index: 0 });
    assert_eq!(d.take_events(), vec![DeckEvent::SlideActivated(0)]);
}

#[test]
fn backward_direction_is_recorded() {
    let mut d = deck(5);
    d.request_go_to(4, ms(0));
    d.tick(ms(SETTLE));
    d.request_go_to(1, ms(1_000));
    assert_eq!(d.direction(), Some(Direction::Backward));
    d.tick(ms(1_000 + SETTLE));
    assert_eq!(d.current_index(), 1);
}

#[test]
fn signals_update_before_settle() {
    let mut d = deck(5);
    d.request_go_to(4, ms(0));
    let s = d.signals();
    assert_eq!(s.index, 4);
    assert_eq!(s.progress, 100.0);
    assert!(s.prev_enabled);
    assert!(!s.next_enabled);
    assert_eq!(s.active_chapter, "ch4");
    assert!(d.is_transitioning());
}

#[test]
fn chapter_jump_targets_first_slide() {
    let sources = vec![
        source("intro", "a"),
        source("method", "b"),
        source("method", "c"),
        source("outro", "d"),
    ];
    let mut d = SlideDeck::new(prepare(sources), DeckTiming::default(), false, 0, ms(0));
    assert_eq!(
        d.chapters()
            .iter()
            .map(|c| (c.id.as_str(), c.first_index))
            .collect::<Vec<_>>(),
        vec![("intro", 0), ("method", 1), ("outro", 3)]
    );
    let target = d.first_index_of("method");
    assert_eq!(target, Some(1));
    d.request_go_to(2, ms(0));
    d.tick(ms(SETTLE));
    assert_eq!(d.signals().active_chapter, "method");
    assert_eq!(d.first_index_of("missing"), None);
}

#[test]
fn start_index_is_clamped() {
    let sources = vec![source("a", "x"), source("b", "y")];
    let d = SlideDeck::new(prepare(sources), DeckTiming::default(), false, 9, ms(0));
    assert_eq!(d.current_index(), 1);
    assert!(!d.signals().next_enabled);
}

#[test]
fn reduced_motion_settles_immediately() {
    let sources = (0..3).map(|i| source(&format!("c{i}"), "w1 w2 w3")).collect();
    let mut d = SlideDeck::new(prepare(sources), DeckTiming::default(), true, 0, ms(0));
    assert!(d.slide(0).is_some_and(Slide::all_revealed));
    assert!(d.request_next(ms(5)));
    assert_eq!(d.state(), DeckState::Idle { index: 1 });
    assert!(d.slide(1).is_some_and(Slide::all_revealed));
    assert_eq!(d.glow_offset(1, ms(5)), 0.0);
    assert!(d.next_wakeup().is_none());
}

#[test]
fn teardown_cancels_everything() {
    let mut d = deck(3);
    d.request_next(ms(0));
    assert!(d.teardown() > 0);
    assert!(d.next_wakeup().is_none());
    // No post-teardown mutation.
    d.tick(ms(10_000));
    assert!(d.is_transitioning());
    assert!(!d.request_next(ms(10_000)));
}

#[test]
fn empty_deck_ignores_navigation() {
    let mut d = SlideDeck::new(Vec::new(), DeckTiming::default(), false, 0, ms(0));
    assert!(!d.request_next(ms(0)));
    assert!(!d.request_go_to(0, ms(0)));
    assert!(d.chapters().is_empty());
}
