use std::time::Duration;

use serde::Serialize;

use crate::content::ContentNode;
use crate::reveal::{AnimatableUnit, UnitKind};
use crate::schedule::steps;
use crate::segment;

/// Delay between consecutive diamond path draws.
const PATH_STEP: Duration = Duration::from_millis(250);
/// First orbit tag lights up after this, then one every `TAG_STEP`.
const TAG_LEAD: Duration = Duration::from_millis(250);
const TAG_STEP: Duration = Duration::from_millis(180);
const CONNECTOR_LEAD: Duration = Duration::from_millis(200);
const CONNECTOR_STEP: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideKind {
    Hero,
    Statement,
    #[default]
    Content,
}

impl SlideKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hero" => Some(Self::Hero),
            "statement" => Some(Self::Statement),
            "content" => Some(Self::Content),
            _ => None,
        }
    }
}

/// Decorative reveal targets attached to a slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Decorations {
    pub diamond_paths: usize,
    pub orbit_tags: Vec<String>,
    pub connectors: usize,
}

/// A slide as parsed, before segmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSource {
    pub chapter_id: String,
    pub light: bool,
    pub kind: SlideKind,
    pub content: ContentNode,
    pub decorations: Decorations,
}

/// A prepared slide: segmented content plus its animatable units.
///
/// Units are laid out as all words (indexed by ordinal), then diamond
/// paths, orbit tags and connector lines.
#[derive(Debug, Clone)]
pub struct Slide {
    pub index: usize,
    pub chapter_id: String,
    pub light: bool,
    pub kind: SlideKind,
    pub content: ContentNode,
    pub decorations: Decorations,
    pub units: Vec<AnimatableUnit>,
    word_count: usize,
}

impl Slide {
    pub fn prepare(index: usize, source: SlideSource, stagger_step: Duration) -> Self {
        let content = segment::segment(&source.content);
        let mut units: Vec<AnimatableUnit> = content
            .words()
            .iter()
            .map(|w| AnimatableUnit::new(UnitKind::Word, w.stagger_delay(stagger_step)))
            .collect();
        let word_count = units.len();

        let deco = &source.decorations;
        units.extend((0..deco.diamond_paths).map(|i| {
            AnimatableUnit::new(UnitKind::Path, steps(PATH_STEP, i))
        }));
        units.extend((0..deco.orbit_tags.len()).map(|i| {
            AnimatableUnit::new(UnitKind::Tag, TAG_LEAD.saturating_add(steps(TAG_STEP, i)))
        }));
        units.extend((0..deco.connectors).map(|i| {
            AnimatableUnit::new(
                UnitKind::Connector,
                CONNECTOR_LEAD.saturating_add(steps(CONNECTOR_STEP, i)),
            )
        }));

        Self {
            index,
            chapter_id: source.chapter_id,
            light: source.light,
            kind: source.kind,
            content,
            decorations: source.decorations,
            units,
            word_count,
        }
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn word_unit(&self, ordinal: usize) -> Option<&AnimatableUnit> {
        if ordinal < self.word_count {
            self.units.get(ordinal)
        } else {
            None
        }
    }

    pub fn path_unit(&self, i: usize) -> Option<&AnimatableUnit> {
        if i < self.decorations.diamond_paths {
            self.units.get(self.word_count + i)
        } else {
            None
        }
    }

    pub fn tag_unit(&self, i: usize) -> Option<&AnimatableUnit> {
        if i < self.decorations.orbit_tags.len() {
            self.units
                .get(self.word_count + self.decorations.diamond_paths + i)
        } else {
            None
        }
    }

    pub fn connector_unit(&self, i: usize) -> Option<&AnimatableUnit> {
        if i < self.decorations.connectors {
            let base =
                self.word_count + self.decorations.diamond_paths + self.decorations.orbit_tags.len();
            self.units.get(base + i)
        } else {
            None
        }
    }

    /// Time the unit takes to become fully visible once revealed. Diamond
    /// paths draw progressively slower.
    pub fn unit_fade(&self, unit: usize, base: Duration) -> Duration {
        match self.units.get(unit).map(|u| u.kind) {
            Some(UnitKind::Path) => {
                let i = unit - self.word_count;
                Duration::from_millis(1_400 + 300 * i as u64)
            }
            _ => base,
        }
    }

    pub fn all_revealed(&self) -> bool {
        self.units.iter().all(AnimatableUnit::is_revealed)
    }
}
