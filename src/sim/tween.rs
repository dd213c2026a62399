//! Tick-sampled tweens
//!
//! Fades and the camera shake are plain values advanced by `dt` each tick;
//! nothing here owns a clock.

use glam::Vec2;

use crate::consts::{CAMERA_SHAKE_REPEATS, CAMERA_SHAKE_STEP};

/// Easing curves over normalized time `t` in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadraticIn,
    QuadraticOut,
    SinusoidalInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticIn => t * t,
            Easing::QuadraticOut => t * (2.0 - t),
            Easing::SinusoidalInOut => 0.5 * (1.0 - (std::f32::consts::PI * t).cos()),
        }
    }
}

/// A single scalar tween
#[derive(Debug, Clone)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance and return the new value
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let k = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * k
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Camera shake: yoyo from rest to `target` and back, repeated
#[derive(Debug, Clone)]
pub struct CameraShake {
    target: Vec2,
    elapsed: f32,
}

impl CameraShake {
    pub fn new(target: Vec2) -> Self {
        Self {
            target,
            elapsed: 0.0,
        }
    }

    fn total_duration() -> f32 {
        CAMERA_SHAKE_STEP * 2.0 * (CAMERA_SHAKE_REPEATS + 1) as f32
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(Self::total_duration());
    }

    /// Current camera offset
    pub fn offset(&self) -> Vec2 {
        if self.is_finished() {
            return Vec2::ZERO;
        }
        let swing = (self.elapsed % (CAMERA_SHAKE_STEP * 2.0)) / CAMERA_SHAKE_STEP;
        let k = if swing < 1.0 { swing } else { 2.0 - swing };
        self.target * Easing::SinusoidalInOut.apply(k)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= Self::total_duration()
    }
}
