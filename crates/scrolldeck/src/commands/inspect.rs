use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use serde::Serialize;

use crate::config::Config;
use crate::content::ContentNode;
use crate::deck::{self, Decorations, SlideKind};
use crate::parser::{self, DeckMeta, Presentation};

#[derive(Debug, Serialize)]
pub struct DeckReport<'a> {
    pub meta: &'a DeckMeta,
    pub stagger_step_ms: u64,
    pub chapters: Vec<ChapterReport>,
    pub slides: Vec<SlideReport>,
}

#[derive(Debug, Serialize)]
pub struct ChapterReport {
    pub id: String,
    pub first_slide: usize,
}

#[derive(Debug, Serialize)]
pub struct SlideReport {
    pub index: usize,
    pub chapter: String,
    pub kind: SlideKind,
    pub light: bool,
    pub text: String,
    pub words: Vec<WordReport>,
    pub decorations: Decorations,
    /// Last word starts fading in this long after activation.
    pub cascade_ms: u64,
    pub content: ContentNode,
}

#[derive(Debug, Serialize)]
pub struct WordReport {
    pub ordinal: usize,
    pub text: String,
    pub delay_ms: u64,
}

pub fn report(presentation: &Presentation, stagger_step: Duration) -> DeckReport<'_> {
    let slides = presentation.prepare(stagger_step);
    let chapters = deck::chapters(&slides)
        .into_iter()
        .map(|c| ChapterReport {
            id: c.id,
            first_slide: c.first_index,
        })
        .collect();
    let slides = slides
        .into_iter()
        .map(|slide| {
            let words: Vec<WordReport> = slide
                .content
                .words()
                .into_iter()
                .map(|w| WordReport {
                    ordinal: w.ordinal,
                    text: w.text.clone(),
                    delay_ms: w.stagger_delay(stagger_step).as_millis() as u64,
                })
                .collect();
            SlideReport {
                index: slide.index,
                chapter: slide.chapter_id,
                kind: slide.kind,
                light: slide.light,
                text: slide.content.rendered_text(),
                cascade_ms: words.last().map_or(0, |w| w.delay_ms),
                words,
                decorations: slide.decorations,
                content: slide.content,
            }
        })
        .collect();
    DeckReport {
        meta: &presentation.meta,
        stagger_step_ms: stagger_step.as_millis() as u64,
        chapters,
        slides,
    }
}

pub fn run(file: &Path, json: bool) -> anyhow::Result<()> {
    let presentation = parser::load(file)?;
    let stagger_step = Config::load_or_default().deck_timing().stagger_step;
    let report = report(&presentation, stagger_step);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let title = report.meta.title.as_deref().unwrap_or("(untitled)");
    println!("{} {}", title.bold(), format!("({})", file.display()).dimmed());
    println!(
        "{} slides, {} chapters, {}ms stagger step",
        report.slides.len(),
        report.chapters.len(),
        report.stagger_step_ms
    );
    println!();

    for slide in &report.slides {
        let mut flags = vec![format!("{:?}", slide.kind).to_lowercase()];
        if slide.light {
            flags.push("light".to_string());
        }
        println!(
            "{} {} {}",
            format!("{:>3}", slide.index + 1).bold(),
            slide.chapter.cyan(),
            format!("[{}]", flags.join(", ")).dimmed()
        );
        let text = slide.text.replace('\n', " / ");
        if !text.trim().is_empty() {
            println!("    {text}");
        }
        println!(
            "    {} words, cascade {}ms",
            slide.words.len(),
            slide.cascade_ms
        );
        let deco = &slide.decorations;
        if deco.diamond_paths > 0 || !deco.orbit_tags.is_empty() || deco.connectors > 0 {
            println!(
                "    {}",
                format!(
                    "diamond {} / orbit {} / connectors {}",
                    deco.diamond_paths,
                    deco.orbit_tags.join(", "),
                    deco.connectors
                )
                .yellow()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = "---\ntitle: Demo\n---\n\n@chapter: one\n# Hello **there**\n\n---\n\n@kind: statement\n@diamond: 2\nSay it once\n";

    #[test]
    fn report_lists_words_with_delays() {
        let presentation = parser::parse(DECK).unwrap();
        let report = report(&presentation, Duration::from_millis(50));
        assert_eq!(report.slides.len(), 2);
        assert_eq!(report.chapters.len(), 1);
        assert_eq!(report.chapters[0].id, "one");

        let first = &report.slides[0];
        let words: Vec<_> = first.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(words, ["Hello", "there"]);
        assert_eq!(first.words[1].delay_ms, 50);
        assert_eq!(first.cascade_ms, 50);

        let second = &report.slides[1];
        assert_eq!(second.chapter, "one");
        assert_eq!(second.kind, SlideKind::Statement);
        assert_eq!(second.decorations.diamond_paths, 2);
        assert_eq!(second.cascade_ms, 100);
    }

    #[test]
    fn report_serializes_to_json() {
        let presentation = parser::parse(DECK).unwrap();
        let report = report(&presentation, Duration::from_millis(45));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["meta"]["title"], "Demo");
        assert_eq!(value["slides"][1]["kind"], "statement");
        assert_eq!(value["slides"][0]["words"][0]["text"], "Hello");
    }
}
