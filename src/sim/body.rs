//! Arcade-style physics bodies
//!
//! A body is an axis-aligned box attached to a sprite position. The sprite
//! position is the top-left corner of the 32px sprite; the collision box sits
//! at `pos + offset` with size `size`, so a body can be narrower than the
//! sprite it belongs to.

use glam::Vec2;

use crate::consts::{OBJECT_MAX_VEL, TILE_SIZE};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Box covering one tile cell
    pub fn tile(x: usize, y: usize) -> Self {
        Self::new(
            Vec2::new(x as f32, y as f32) * TILE_SIZE,
            Vec2::splat(TILE_SIZE),
        )
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap: boxes that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// A physics body
#[derive(Debug, Clone)]
pub struct Body {
    /// Sprite position (top-left of the sprite)
    pub pos: Vec2,
    /// Collision box offset from `pos`
    pub offset: Vec2,
    /// Collision box size
    pub size: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    /// Deceleration applied on an axis with no acceleration
    pub drag: Vec2,
    pub gravity: Vec2,
    /// Per-axis speed cap
    pub max_vel: Vec2,
    pub bounce: Vec2,
    /// Immovable bodies push others but are never pushed
    pub immovable: bool,
    /// Disabled bodies take no part in collisions
    pub enabled: bool,
    pub visible: bool,
}

impl Body {
    /// A full-tile body at a sprite position
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            offset: Vec2::ZERO,
            size: Vec2::splat(TILE_SIZE),
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            drag: Vec2::ZERO,
            gravity: Vec2::ZERO,
            max_vel: Vec2::splat(OBJECT_MAX_VEL),
            bounce: Vec2::ZERO,
            immovable: false,
            enabled: true,
            visible: true,
        }
    }

    /// Same body, marked immovable
    pub fn immovable(mut self) -> Self {
        self.immovable = true;
        self
    }

    /// Collision box in world space
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos + self.offset, self.size)
    }

    /// Hide and disable (consumed objects are never destroyed)
    pub fn hide(&mut self) {
        self.visible = false;
        self.enabled = false;
    }

    /// Zero all motion, including gravity
    pub fn stop_motion(&mut self) {
        self.vel = Vec2::ZERO;
        self.accel = Vec2::ZERO;
        self.gravity = Vec2::ZERO;
    }

    /// Set acceleration toward a point, capping speed on both axes
    pub fn accelerate_toward(&mut self, target: Vec2, accel: f32, max_vel: f32) {
        let dir = (target - self.pos).normalize_or_zero();
        self.accel = dir * accel;
        self.max_vel = Vec2::splat(max_vel);
    }

    /// Advance velocity and position by one timestep
    pub fn integrate(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }
        self.vel.x = compute_velocity(
            self.vel.x,
            self.accel.x,
            self.drag.x,
            self.gravity.x,
            self.max_vel.x,
            dt,
        );
        self.vel.y = compute_velocity(
            self.vel.y,
            self.accel.y,
            self.drag.y,
            self.gravity.y,
            self.max_vel.y,
            dt,
        );
        self.pos += self.vel * dt;
    }
}

/// One axis of velocity integration
///
/// Gravity always applies. Acceleration wins over drag; drag only slows a
/// body on an axis with no acceleration and never reverses it.
fn compute_velocity(vel: f32, accel: f32, drag: f32, gravity: f32, max: f32, dt: f32) -> f32 {
    let mut v = vel + gravity * dt;
    if accel != 0.0 {
        v += accel * dt;
    } else if drag != 0.0 {
        let d = drag * dt;
        v = if v - d > 0.0 {
            v - d
        } else if v + d < 0.0 {
            v + d
        } else {
            0.0
        };
    }
    v.clamp(-max, max)
}
