//! Progress bar, counter, chapter nav and arrow buttons.
//!
//! Clicks on the nav and arrows come back as [`InputEvent`]s so they flow
//! through the same multiplexer as keys and gestures.

use eframe::egui::{self, Align2, CornerRadius, FontFamily, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use crate::deck::Chapter;
use crate::input::{ArrowButton, InputEvent};
use crate::theme::Theme;

pub struct Chrome<'a> {
    /// 0–100.
    pub progress: f32,
    pub counter: Option<String>,
    pub footer: Option<&'a str>,
    pub chapters: &'a [Chapter],
    pub active_chapter: Option<&'a str>,
    pub nav_visible: bool,
    /// `Some((prev_enabled, next_enabled))` when arrows are shown.
    pub arrows: Option<(bool, bool)>,
    /// Chrome sits over a light section and switches to dark ink.
    pub on_light: bool,
}

/// Hit rects of the chapter dots, stacked on the right edge and centred
/// vertically.
pub fn nav_dot_rects(rect: Rect, count: usize, scale: f32) -> Vec<Rect> {
    let size = 22.0 * scale;
    let gap = 10.0 * scale;
    let total = count as f32 * size + count.saturating_sub(1) as f32 * gap;
    let x = rect.right() - 36.0 * scale;
    let top = rect.center().y - total / 2.0;
    (0..count)
        .map(|i| {
            let y = top + i as f32 * (size + gap) + size / 2.0;
            Rect::from_center_size(Pos2::new(x, y), Vec2::splat(size))
        })
        .collect()
}

/// Previous and next button rects in the bottom-left corner.
pub fn arrow_rects(rect: Rect, scale: f32) -> [Rect; 2] {
    let size = Vec2::splat(44.0 * scale);
    let y = rect.bottom() - 56.0 * scale;
    let x = rect.left() + 48.0 * scale;
    [
        Rect::from_center_size(Pos2::new(x, y), size),
        Rect::from_center_size(Pos2::new(x + 56.0 * scale, y), size),
    ]
}

pub fn draw(ui: &egui::Ui, theme: &Theme, rect: Rect, scale: f32, chrome: &Chrome<'_>) -> Vec<InputEvent> {
    let painter = ui.painter();
    let palette = theme.for_slide(chrome.on_light);
    let ink = palette.foreground;
    let mut events = Vec::new();

    // Progress bar
    let bar = Rect::from_min_size(rect.left_top(), Vec2::new(rect.width(), 3.0 * scale));
    painter.rect_filled(bar, 0.0, Theme::with_opacity(ink, 0.08));
    let filled = bar.width() * (chrome.progress / 100.0).clamp(0.0, 1.0);
    painter.rect_filled(
        Rect::from_min_size(bar.min, Vec2::new(filled, bar.height())),
        0.0,
        palette.accent,
    );

    let small = FontId::new(palette.chrome_size * scale.max(0.6), FontFamily::Monospace);
    if let Some(counter) = &chrome.counter {
        painter.text(
            Pos2::new(rect.right() - 24.0 * scale, rect.bottom() - 32.0 * scale),
            Align2::RIGHT_CENTER,
            counter,
            small.clone(),
            Theme::with_opacity(ink, 0.5),
        );
    }
    if let Some(footer) = chrome.footer {
        painter.text(
            Pos2::new(rect.center().x, rect.bottom() - 32.0 * scale),
            Align2::CENTER_CENTER,
            footer,
            FontId::new(palette.chrome_size * scale.max(0.6), FontFamily::Proportional),
            Theme::with_opacity(ink, 0.4),
        );
    }

    if chrome.nav_visible && chrome.chapters.len() > 1 {
        for (chapter, dot) in chrome.chapters.iter().zip(nav_dot_rects(rect, chrome.chapters.len(), scale)) {
            let response = ui.interact(dot, ui.id().with(("chapter-dot", &chapter.id)), Sense::click());
            let active = chrome.active_chapter == Some(chapter.id.as_str());
            let radius = if active { 6.0 } else { 4.0 } * scale;
            let color = if active {
                palette.accent
            } else if response.hovered() {
                Theme::with_opacity(ink, 0.8)
            } else {
                Theme::with_opacity(ink, 0.35)
            };
            painter.circle_filled(dot.center(), radius, color);
            if response.hovered() {
                painter.text(
                    dot.left_center() - Vec2::new(8.0 * scale, 0.0),
                    Align2::RIGHT_CENTER,
                    &chapter.id,
                    small.clone(),
                    Theme::with_opacity(ink, 0.7),
                );
            }
            if response.clicked() {
                events.push(InputEvent::NavClick(chapter.id.clone()));
            }
        }
    }

    if let Some((prev_enabled, next_enabled)) = chrome.arrows {
        let [prev, next] = arrow_rects(rect, scale);
        let buttons = [
            (prev, ArrowButton::Previous, prev_enabled, "‹"),
            (next, ArrowButton::Next, next_enabled, "›"),
        ];
        for (hit, button, enabled, glyph) in buttons {
            let sense = if enabled { Sense::click() } else { Sense::hover() };
            let response = ui.interact(hit, ui.id().with(("arrow", glyph)), sense);
            let alpha = match (enabled, response.hovered()) {
                (false, _) => 0.15,
                (true, true) => 0.9,
                (true, false) => 0.55,
            };
            painter.rect_stroke(
                hit,
                CornerRadius::same(255),
                Stroke::new(1.0 * scale, Theme::with_opacity(ink, alpha * 0.6)),
                egui::StrokeKind::Inside,
            );
            painter.text(
                hit.center(),
                Align2::CENTER_CENTER,
                glyph,
                FontId::new(26.0 * scale, FontFamily::Proportional),
                Theme::with_opacity(ink, alpha),
            );
            if enabled && response.clicked() {
                events.push(InputEvent::Arrow(button));
            }
        }
    }

    events
}
