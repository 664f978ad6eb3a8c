//! Diamond figure, orbit tags and connector lines.

use std::f32::consts::TAU;

use eframe::egui::{self, Color32, CornerRadius, FontFamily, FontId, Pos2, Rect, Stroke, Vec2};

use crate::deck::Slide;
use crate::deck::motion::ease_out_cubic;
use crate::theme::Theme;

use super::RevealSource;

/// The first `t` (0..=1) of a polyline by arc length.
pub fn partial_polyline(points: &[Pos2], t: f32) -> Vec<Pos2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let total: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    let mut budget = total * t.clamp(0.0, 1.0);
    let mut out = vec![first];
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if budget >= len {
            out.push(w[1]);
            budget -= len;
        } else {
            if budget > 0.0 && len > 0.0 {
                out.push(w[0] + (w[1] - w[0]) * (budget / len));
            }
            break;
        }
    }
    out
}

fn diamond(center: Pos2, radius: f32) -> [Pos2; 5] {
    [
        center + Vec2::new(0.0, -radius),
        center + Vec2::new(radius, 0.0),
        center + Vec2::new(0.0, radius),
        center + Vec2::new(-radius, 0.0),
        center + Vec2::new(0.0, -radius),
    ]
}

pub fn draw(
    painter: &egui::Painter,
    slide: &Slide,
    theme: &Theme,
    rect: Rect,
    scale: f32,
    reveal: &dyn RevealSource,
) {
    let deco = &slide.decorations;
    let base = slide.word_count();
    let center = Pos2::new(rect.right() - rect.width() * 0.22, rect.center().y);

    for i in 0..deco.diamond_paths {
        let t = ease_out_cubic(reveal.unit_progress(slide.index, base + i));
        if t <= 0.0 {
            continue;
        }
        let radius = 220.0 * scale * (1.0 - 0.18 * i as f32).max(0.1);
        let line = partial_polyline(&diamond(center, radius), t);
        let color = Theme::with_opacity(theme.accent, 0.8 - 0.1 * i as f32);
        painter.line(line, Stroke::new(2.0 * scale, color));
    }

    let base = base + deco.diamond_paths;
    let n = deco.orbit_tags.len().max(1) as f32;
    for (i, label) in deco.orbit_tags.iter().enumerate() {
        let t = reveal.unit_progress(slide.index, base + i);
        if t <= 0.0 {
            continue;
        }
        let angle = -TAU / 4.0 + TAU * i as f32 / n;
        let pos = center + Vec2::angled(angle) * 300.0 * scale;
        let font = FontId::new(theme.chrome_size * 1.2 * scale.max(0.6), FontFamily::Proportional);
        let fill = if t >= 1.0 { theme.accent } else { theme.muted };
        let galley = painter.layout_no_wrap(label.clone(), font, Theme::with_opacity(theme.heading_color, t));
        let pill = Rect::from_center_size(pos, galley.size() + Vec2::new(28.0, 14.0) * scale);
        painter.rect_filled(pill, CornerRadius::same(255), Theme::with_opacity(fill, 0.25 * t));
        painter.galley(pill.center() - galley.size() / 2.0, galley, Color32::WHITE);
    }

    let base = base + deco.orbit_tags.len();
    let count = deco.connectors;
    if count > 0 {
        let y = rect.bottom() - 140.0 * scale;
        let gap = rect.width() / (count + 1) as f32;
        let length = 120.0 * scale;
        for i in 0..count {
            let t = ease_out_cubic(reveal.unit_progress(slide.index, base + i));
            if t <= 0.0 {
                continue;
            }
            let x = rect.left() + gap * (i + 1) as f32;
            let half = length * t / 2.0;
            painter.line_segment(
                [Pos2::new(x - half, y), Pos2::new(x + half, y)],
                Stroke::new(1.5 * scale, Theme::with_opacity(theme.muted, t)),
            );
            painter.circle_filled(Pos2::new(x, y), 3.0 * scale, Theme::with_opacity(theme.accent, t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_polyline_walks_by_length() {
        let square = diamond(Pos2::ZERO, 10.0);
        assert_eq!(partial_polyline(&square, 0.0), vec![square[0]]);
        assert_eq!(partial_polyline(&square, 1.0).len(), 5);

        let half = partial_polyline(&square, 0.5);
        let end = half.last().copied().unwrap_or(Pos2::ZERO);
        assert!(end.distance(square[2]) < 1e-3);

        let eighth = partial_polyline(&square, 0.125);
        assert_eq!(eighth.len(), 2);
        assert!(eighth[1].distance(Pos2::new(5.0, -5.0)) < 1e-3);
    }

    #[test]
    fn empty_polyline() {
        assert!(partial_polyline(&[], 0.5).is_empty());
    }
}
