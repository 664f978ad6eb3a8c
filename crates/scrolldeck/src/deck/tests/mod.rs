mod navigation;

use std::time::Duration;

use super::{DeckTiming, Decorations, Slide, SlideDeck, SlideKind, SlideSource};
use crate::content::{ContentNode, Tag};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Helper to create a slide source with a one-paragraph body.
fn source(chapter: &str, text: &str) -> SlideSource {
    SlideSource {
        chapter_id: chapter.to_string(),
        light: false,
        kind: SlideKind::Content,
        content: ContentNode::element(Tag::Paragraph, vec![ContentNode::text(text)]),
        decorations: Decorations::default(),
    }
}

/// Prepare sources with the default stagger step.
fn prepare(sources: Vec<SlideSource>) -> Vec<Slide> {
    let step = DeckTiming::default().stagger_step;
    sources
        .into_iter()
        .enumerate()
        .map(|(i, s)| Slide::prepare(i, s, step))
        .collect()
}

/// A deck of `n` three-word slides, each in its own chapter, at time zero.
fn deck(n: usize) -> SlideDeck {
    let sources = (0..n)
        .map(|i| source(&format!("ch{i}"), "one two three"))
        .collect();
    SlideDeck::new(prepare(sources), DeckTiming::default(), false, 0, ms(0))
}

fn revealed(deck: &SlideDeck, index: usize) -> Vec<bool> {
    deck.slide(index)
        .map(|s| s.units.iter().map(|u| u.is_revealed()).collect())
        .unwrap_or_default()
}

/// Settle time of the default timing.
const SETTLE: u64 = 720;
