use std::time::Duration;

pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn fraction(now: Duration, started: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (now.saturating_sub(started).as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

/// Motion of the content track between two slide positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMotion {
    pub from: usize,
    pub to: usize,
    pub started: Duration,
    pub duration: Duration,
}

impl TrackMotion {
    pub fn at_rest(index: usize) -> Self {
        Self {
            from: index,
            to: index,
            started: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    /// Fractional slide position of the track at `now`.
    pub fn position(&self, now: Duration) -> f32 {
        let t = ease_in_out(fraction(now, self.started, self.duration));
        self.from as f32 + (self.to as f32 - self.from as f32) * t
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        fraction(now, self.started, self.duration) >= 1.0
    }
}

/// Directional offset applied to an incoming slide's glow, easing back to
/// rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowMotion {
    pub offset: f32,
    pub started: Duration,
    pub duration: Duration,
}

impl GlowMotion {
    pub fn offset_at(&self, now: Duration) -> f32 {
        self.offset * (1.0 - ease_out_cubic(fraction(now, self.started, self.duration)))
    }

    pub fn is_at_rest(&self, now: Duration) -> bool {
        fraction(now, self.started, self.duration) >= 1.0
    }
}
