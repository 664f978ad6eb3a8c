//! Drifting starfield behind the slides.
//!
//! Uses xorshift32 seeded at construction so a given seed and viewport
//! always produce the same field. The field advances once per display frame
//! through a [`FrameLoop`]; cancelling the loop freezes it for good.

use std::f32::consts::TAU;

use crate::schedule::FrameLoop;

/// Particles wrap this far outside the viewport edges.
const WRAP_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub base_size: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub opacity: f32,
    pub base_opacity: f32,
    pub pulse: f32,
    pub pulse_speed: f32,
    /// 0 = far (slow, violet), 1 = near (fast, pale).
    pub depth: f32,
}

impl Particle {
    pub fn color(&self) -> [u8; 3] {
        let r = (155.0 + 100.0 * self.depth).round() as u8;
        let g = (109.0 + 146.0 * self.depth).round() as u8;
        [r, g, 255]
    }

    /// Larger particles get a soft halo three times their radius.
    pub fn has_halo(&self) -> bool {
        self.size > 2.0
    }
}

fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Uniform in `[0, 1)`.
fn next_unit(state: &mut u32) -> f32 {
    (xorshift32(state) >> 8) as f32 / (1u32 << 24) as f32
}

/// Fewer particles on small screens.
pub fn particle_count(width: f32, height: f32) -> usize {
    let area = width * height;
    if area < 500_000.0 {
        50
    } else if area < 1_200_000.0 {
        80
    } else {
        120
    }
}

#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    scroll_y: f32,
    rng: u32,
    frames: FrameLoop,
}

impl ParticleField {
    pub fn new(width: f32, height: f32, seed: u32) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            width,
            height,
            scroll_y: 0.0,
            rng: seed.max(1),
            frames: FrameLoop::default(),
        };
        field.populate();
        field.frames.start();
        field
    }

    fn populate(&mut self) {
        let count = particle_count(self.width, self.height);
        self.particles = (0..count).map(|_| self.spawn()).collect();
    }

    fn spawn(&mut self) -> Particle {
        let rng = &mut self.rng;
        let size = next_unit(rng) * 3.0 + 1.0;
        let base_opacity = next_unit(rng) * 0.5 + 0.2;
        Particle {
            x: next_unit(rng) * self.width,
            y: next_unit(rng) * self.height,
            size,
            base_size: size,
            speed_x: (next_unit(rng) - 0.5) * 0.4,
            speed_y: (next_unit(rng) - 0.5) * 0.25 - 0.1,
            opacity: base_opacity,
            base_opacity,
            pulse: next_unit(rng) * TAU,
            pulse_speed: next_unit(rng) * 0.015 + 0.005,
            depth: next_unit(rng),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Re-seed the field for a new viewport size.
    pub fn resize(&mut self, width: f32, height: f32) {
        if (width - self.width).abs() < 0.5 && (height - self.height).abs() < 0.5 {
            return;
        }
        self.width = width;
        self.height = height;
        self.populate();
    }

    pub fn set_scroll(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y;
    }

    /// Advance one frame. Returns false once the loop is cancelled.
    pub fn step(&mut self) -> bool {
        if !self.frames.frame() {
            return false;
        }
        let (w, h) = (self.width, self.height);
        let scroll_y = self.scroll_y;
        for p in &mut self.particles {
            p.pulse += p.pulse_speed;
            let pulse = p.pulse.sin() * 0.3 + 0.7;
            p.size = p.base_size * pulse;
            p.opacity = p.base_opacity * (0.6 + pulse * 0.4);

            let scroll_influence = scroll_y * 0.02 * (1.0 - p.depth);
            p.x += p.speed_x;
            p.y += p.speed_y - scroll_influence * 0.01;

            if p.x < -WRAP_MARGIN {
                p.x = w + WRAP_MARGIN;
            }
            if p.x > w + WRAP_MARGIN {
                p.x = -WRAP_MARGIN;
            }
            if p.y < -WRAP_MARGIN {
                p.y = h + WRAP_MARGIN;
            }
            if p.y > h + WRAP_MARGIN {
                p.y = -WRAP_MARGIN;
            }
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    /// Stop the frame loop. Subsequent steps do nothing.
    pub fn cancel(&mut self) {
        self.frames.cancel();
    }
}
