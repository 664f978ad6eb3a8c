pub mod blocks;
pub mod frontmatter;
pub mod inline;
pub mod splitter;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::warn;

use crate::content::ContentNode;
use crate::deck::{Decorations, Slide, SlideKind, SlideSource};

pub use blocks::Directive;
pub use frontmatter::DeckMeta;

/// Chapter of the first slide when the deck never names one.
pub const DEFAULT_CHAPTER: &str = "intro";

#[derive(Debug, Clone)]
pub struct Presentation {
    pub meta: DeckMeta,
    pub slides: Vec<SlideSource>,
}

impl Presentation {
    /// Segment every slide and build its reveal units. Slides are
    /// independent so this runs in parallel.
    pub fn prepare(&self, stagger_step: Duration) -> Vec<Slide> {
        self.slides
            .par_iter()
            .enumerate()
            .map(|(i, source)| Slide::prepare(i, source.clone(), stagger_step))
            .collect()
    }
}

pub fn load(path: &Path) -> Result<Presentation> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse(content: &str) -> Result<Presentation> {
    let (meta, body) = frontmatter::extract(content)?;
    let mut chapter = DEFAULT_CHAPTER.to_string();
    let slides = splitter::split(&body)
        .iter()
        .map(|raw| {
            let (directives, markdown) = blocks::extract_directives(raw);
            build_slide(&directives, &markdown, &mut chapter)
        })
        .collect();
    Ok(Presentation { meta, slides })
}

/// A slide without `@chapter` stays in the chapter of the slide before it.
fn build_slide(directives: &[Directive], markdown: &str, chapter: &mut String) -> SlideSource {
    let mut light = false;
    let mut kind = SlideKind::default();
    let mut decorations = Decorations::default();

    for d in directives {
        match d.name.as_str() {
            "chapter" if !d.value.is_empty() => *chapter = d.value.clone(),
            "theme" => match d.value.as_str() {
                "light" => light = true,
                "dark" => light = false,
                other => warn!(value = other, "unknown @theme, expected light or dark"),
            },
            "kind" => match SlideKind::from_name(&d.value) {
                Some(k) => kind = k,
                None => warn!(value = %d.value, "unknown @kind"),
            },
            "diamond" => decorations.diamond_paths = count(d),
            "connectors" => decorations.connectors = count(d),
            "orbit" => {
                decorations.orbit_tags = d
                    .value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => warn!(name = %d.name, "ignoring unknown directive"),
        }
    }

    SlideSource {
        chapter_id: chapter.clone(),
        light,
        kind,
        content: ContentNode::fragment(blocks::parse(markdown)),
        decorations,
    }
}

/// Upper bound for `@diamond` and `@connectors`.
pub const MAX_DECORATIONS: usize = 8;

fn count(d: &Directive) -> usize {
    let n = d.value.parse().unwrap_or_else(|_| {
        warn!(name = %d.name, value = %d.value, "expected a count");
        0
    });
    if n > MAX_DECORATIONS {
        warn!(name = %d.name, value = n, max = MAX_DECORATIONS, "clamping decoration count");
    }
    n.min(MAX_DECORATIONS)
}
