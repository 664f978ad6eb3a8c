use std::sync::Arc;

use crate::content::{ContentNode, Tag};
use crate::deck::SlideKind;
use crate::theme::Theme;
use eframe::egui::{self, Color32, FontFamily, FontId, Galley, Pos2, Rect, Stroke};

/// Opacity of a word by ordinal.
pub type WordAlpha<'a> = &'a dyn Fn(usize) -> f32;

#[derive(Debug, Clone, Copy)]
struct Style {
    size: f32,
    color: Color32,
    italics: bool,
    strike: bool,
    highlight: Option<Color32>,
}

impl Style {
    fn format(&self, alpha: f32) -> egui::text::TextFormat {
        egui::text::TextFormat {
            font_id: FontId::new(self.size, FontFamily::Proportional),
            color: Theme::with_opacity(self.color, alpha),
            italics: self.italics,
            strikethrough: if self.strike {
                Stroke::new(1.5, Theme::with_opacity(self.color, alpha))
            } else {
                Stroke::NONE
            },
            background: self
                .highlight
                .map_or(Color32::TRANSPARENT, |c| Theme::with_opacity(c, alpha)),
            ..Default::default()
        }
    }
}

/// Size boost for the slide kinds that carry a single big message.
fn kind_scale(kind: SlideKind, tag: Tag) -> f32 {
    match (kind, tag) {
        (SlideKind::Hero, Tag::Heading(_)) => 1.2,
        (SlideKind::Statement, Tag::Paragraph) => 1.4,
        _ => 1.0,
    }
}

/// Build the layout job for one top-level block. Every word is its own
/// section so it can fade independently; spaces follow the word before
/// them.
pub fn block_job(
    block: &ContentNode,
    kind: SlideKind,
    theme: &Theme,
    scale: f32,
    max_width: f32,
    alpha: WordAlpha<'_>,
) -> egui::text::LayoutJob {
    let tag = match block {
        ContentNode::Element(el) => el.tag,
        _ => Tag::Paragraph,
    };
    let (size, color) = match tag {
        Tag::Heading(level) => (theme.heading_size(level), theme.heading_color),
        _ => (theme.body_size, theme.foreground),
    };
    let style = Style {
        size: size * scale * kind_scale(kind, tag),
        color,
        italics: false,
        strike: false,
        highlight: None,
    };
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = max_width;
    let mut last_alpha = 1.0;
    append(&mut job, block, style, theme, alpha, &mut last_alpha);
    job
}

fn append(
    job: &mut egui::text::LayoutJob,
    node: &ContentNode,
    style: Style,
    theme: &Theme,
    alpha: WordAlpha<'_>,
    last_alpha: &mut f32,
) {
    match node {
        ContentNode::Word(w) => {
            *last_alpha = alpha(w.ordinal);
            job.append(&w.text, 0.0, style.format(*last_alpha));
        }
        ContentNode::Space => job.append(" ", 0.0, style.format(*last_alpha)),
        ContentNode::Break => job.append("\n", 0.0, style.format(1.0)),
        ContentNode::Text { text } => job.append(text, 0.0, style.format(1.0)),
        ContentNode::Element(el) => {
            let mut inner = style;
            match el.tag {
                Tag::Strong => {
                    inner.color = theme.heading_color;
                    inner.size += 1.0;
                }
                Tag::Emphasis => inner.italics = true,
                Tag::Strikethrough => inner.strike = true,
                Tag::Highlight => {
                    inner.highlight = Some(theme.highlight);
                    inner.color = theme.heading_color;
                }
                Tag::Fragment | Tag::Heading(_) | Tag::Paragraph => {}
            }
            for child in &el.children {
                append(job, child, inner, theme, alpha, last_alpha);
            }
        }
    }
}

/// The top-level blocks of slide content.
pub fn blocks(content: &ContentNode) -> Vec<&ContentNode> {
    match content {
        ContentNode::Element(el) if el.tag == Tag::Fragment => el.children.iter().collect(),
        other => vec![other],
    }
}

/// Lay out and paint a slide's content inside `rect`. Hero and statement
/// slides are centred; content slides sit top-left. Returns the screen
/// rect of every block.
#[allow(clippy::too_many_arguments)]
pub fn draw_content(
    painter: &egui::Painter,
    content: &ContentNode,
    kind: SlideKind,
    theme: &Theme,
    rect: Rect,
    scale: f32,
    alpha: WordAlpha<'_>,
) -> Vec<Rect> {
    let padding = 80.0 * scale;
    let spacing = 24.0 * scale;
    let max_width = (rect.width() - padding * 2.0).max(1.0);

    let galleys: Vec<Arc<Galley>> = blocks(content)
        .into_iter()
        .map(|b| painter.layout_job(block_job(b, kind, theme, scale, max_width, alpha)))
        .collect();
    let total: f32 = galleys.iter().map(|g| g.size().y).sum::<f32>()
        + spacing * galleys.len().saturating_sub(1) as f32;

    let centered = kind != SlideKind::Content;
    let mut y = if centered {
        rect.center().y - total / 2.0
    } else {
        rect.top() + padding
    };

    let mut rects = Vec::with_capacity(galleys.len());
    for galley in galleys {
        let size = galley.size();
        let x = if centered {
            rect.center().x - size.x / 2.0
        } else {
            rect.left() + padding
        };
        let pos = Pos2::new(x, y);
        rects.push(Rect::from_min_size(pos, size));
        painter.galley(pos, galley, theme.foreground);
        y += size.y + spacing;
    }
    rects
}
