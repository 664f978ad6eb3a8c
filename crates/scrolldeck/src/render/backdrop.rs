use eframe::egui::{self, Color32, Pos2, Rect, Vec2};

use crate::effects::ParticleField;
use crate::effects::ambient::OrbTransform;
use crate::theme::Theme;

/// Orb anchors as fractions of the viewport.
const ORB_ANCHORS: [(f32, f32, f32); 3] = [(0.18, 0.22, 0.42), (0.82, 0.35, 0.36), (0.45, 0.85, 0.5)];

/// Concentric translucent discs, brightest in the middle.
fn soft_disc(painter: &egui::Painter, center: Pos2, radius: f32, color: Color32, opacity: f32) {
    const RINGS: usize = 8;
    for ring in 0..RINGS {
        let t = 1.0 - ring as f32 / RINGS as f32;
        painter.circle_filled(
            center,
            radius * t,
            Theme::with_opacity(color, opacity * 0.06 * (1.0 - t * 0.5)),
        );
    }
}

pub fn draw_orbs(
    painter: &egui::Painter,
    rect: Rect,
    theme: &Theme,
    transforms: &[OrbTransform],
    opacity: f32,
) {
    let base = rect.width().min(rect.height());
    for ((fx, fy, size), t) in ORB_ANCHORS.iter().zip(transforms) {
        let center = Pos2::new(rect.left() + rect.width() * fx + t.dx, rect.top() + rect.height() * fy + t.dy);
        soft_disc(painter, center, base * size * t.scale, theme.orb, opacity);
    }
}

pub fn orb_count() -> usize {
    ORB_ANCHORS.len()
}

pub fn draw_particles(painter: &egui::Painter, rect: Rect, field: &ParticleField, opacity: f32) {
    for p in field.particles() {
        let [r, g, b] = p.color();
        let pos = rect.left_top() + Vec2::new(p.x, p.y);
        if !rect.expand(p.size * 3.0).contains(pos) {
            continue;
        }
        let color = Color32::from_rgb(r, g, b);
        if p.has_halo() {
            painter.circle_filled(pos, p.size * 3.0, Theme::with_opacity(color, p.opacity * opacity * 0.15));
        }
        painter.circle_filled(pos, p.size, Theme::with_opacity(color, p.opacity * opacity));
    }
}

/// Glow behind the active slide, displaced horizontally by `offset`.
pub fn draw_glow(painter: &egui::Painter, rect: Rect, theme: &Theme, intensity: f32, offset: f32) {
    if intensity <= 0.0 {
        return;
    }
    let center = rect.center() + Vec2::new(offset, 0.0);
    soft_disc(painter, center, rect.height() * 0.45, theme.accent, intensity);
}
