//! Scroll-driven ambience: gradient orbs, parallax, light-section dimming,
//! and the active-slide glow fed by deck notifications.

use std::f32::consts::PI;
use std::time::Duration;

use crate::deck::DeckEvent;

/// Translation and scale of one gradient orb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbTransform {
    pub dx: f32,
    pub dy: f32,
    pub scale: f32,
}

/// Orbs drift at different speeds so the backdrop gains depth as the page
/// scrolls. `progress` is the scroll fraction in `[0, 1]`.
pub fn orb_transform(i: usize, scroll_top: f32, progress: f32) -> OrbTransform {
    let i = i as f32;
    let speed = (i + 1.0) * 0.05;
    OrbTransform {
        dx: (progress * PI * 2.0 + i).sin() * 30.0,
        dy: scroll_top * speed * -0.15,
        scale: 1.0 + (progress * PI + i * 0.5).sin() * 0.08,
    }
}

/// Vertical shift for a parallax element whose centre sits `center` pixels
/// below the viewport top. `None` when the element is too far away to
/// bother.
pub fn parallax_shift(center: f32, viewport_height: f32, speed: f32) -> Option<f32> {
    if viewport_height <= 0.0 || center <= -viewport_height || center >= viewport_height * 2.0 {
        return None;
    }
    let offset = (center - viewport_height / 2.0) / viewport_height;
    Some(offset * speed * -80.0)
}

/// Scroll position as a fraction of the scrollable distance.
pub fn scroll_fraction(scroll_top: f32, document_height: f32, viewport_height: f32) -> f32 {
    let scrollable = document_height - viewport_height;
    if scrollable > 0.0 {
        (scroll_top / scrollable).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Whether a section spanning `[top, bottom]` (viewport coordinates)
/// covers the band between `lo` and `hi` fractions of the viewport.
pub fn covers_band(top: f32, bottom: f32, viewport_height: f32, lo: f32, hi: f32) -> bool {
    top < viewport_height * hi && bottom > viewport_height * lo
}

/// Background layer opacity; light sections keep it partially visible.
pub fn backdrop_opacity(in_light: bool) -> f32 {
    if in_light { 0.35 } else { 1.0 }
}

pub fn orb_opacity(in_light: bool) -> f32 {
    if in_light { 0.4 } else { 1.0 }
}

/// Follows deck activation notifications and brightens the glow behind the
/// active slide.
#[derive(Debug, Default)]
pub struct AmbientGlow {
    active: Option<usize>,
    since: Duration,
}

impl AmbientGlow {
    const RAMP: Duration = Duration::from_millis(900);

    pub fn apply(&mut self, events: &[DeckEvent], now: Duration) {
        for event in events {
            match *event {
                DeckEvent::SlideActivated(i) => {
                    self.active = Some(i);
                    self.since = now;
                }
                DeckEvent::SlideDeactivated(i) => {
                    if self.active == Some(i) {
                        self.active = None;
                        self.since = now;
                    }
                }
            }
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Glow intensity of slide `index` in `[0, 1]`.
    pub fn intensity(&self, index: usize, now: Duration) -> f32 {
        if self.active != Some(index) {
            return 0.0;
        }
        let t = now.saturating_sub(self.since).as_secs_f32() / Self::RAMP.as_secs_f32();
        t.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_orb_at_top_is_at_rest() {
        let t = orb_transform(0, 0.0, 0.0);
        assert_eq!(t.dx, 0.0);
        assert_eq!(t.dy, 0.0);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn deeper_orbs_move_faster() {
        let a = orb_transform(0, 1_000.0, 0.5);
        let b = orb_transform(2, 1_000.0, 0.5);
        assert!(b.dy < a.dy);
    }

    #[test]
    fn parallax_only_near_viewport() {
        assert_eq!(parallax_shift(400.0, 800.0, 0.2), Some(0.0));
        assert_eq!(parallax_shift(-900.0, 800.0, 0.2), None);
        assert_eq!(parallax_shift(1_700.0, 800.0, 0.2), None);
        let below = parallax_shift(800.0, 800.0, 0.1);
        assert!(below.is_some_and(|s| s < 0.0));
    }

    #[test]
    fn scroll_fraction_handles_short_documents() {
        assert_eq!(scroll_fraction(100.0, 500.0, 800.0), 0.0);
        assert_eq!(scroll_fraction(600.0, 2_000.0, 800.0), 0.5);
        assert_eq!(scroll_fraction(5_000.0, 2_000.0, 800.0), 1.0);
    }

    #[test]
    fn band_coverage() {
        assert!(covers_band(-100.0, 500.0, 800.0, 0.5, 0.5));
        assert!(!covers_band(450.0, 900.0, 800.0, 0.5, 0.5));
        assert!(covers_band(450.0, 900.0, 800.0, 0.4, 0.6));
    }

    #[test]
    fn glow_follows_activation() {
        let mut glow = AmbientGlow::default();
        glow.apply(&[DeckEvent::SlideActivated(2)], Duration::ZERO);
        assert_eq!(glow.active(), Some(2));
        assert_eq!(glow.intensity(2, Duration::from_millis(900)), 1.0);
        assert_eq!(glow.intensity(1, Duration::from_millis(900)), 0.0);
        glow.apply(
            &[DeckEvent::SlideDeactivated(2), DeckEvent::SlideActivated(3)],
            Duration::from_secs(2),
        );
        assert_eq!(glow.active(), Some(3));
        assert_eq!(glow.intensity(3, Duration::from_secs(2)), 0.0);
    }
}
