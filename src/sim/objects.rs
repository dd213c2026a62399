//! Map objects spawned from special tile codes
//!
//! Every object remembers where it spawned so a layer reset can put it back.

use glam::Vec2;
use serde::Serialize;

use super::body::Body;
use super::collision::HasBody;
use crate::consts::*;
use crate::world_to_tile;

/// A resettable sprite: a body plus its spawn position
#[derive(Debug, Clone)]
pub struct Prop {
    pub body: Body,
    origin: Vec2,
}

impl Prop {
    pub fn new(body: Body) -> Self {
        Self {
            origin: body.pos,
            body,
        }
    }

    /// Spawn position
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    /// Consumed: invisible and out of collisions, but kept for reset
    pub fn hide(&mut self) {
        self.body.hide();
        self.body.stop_motion();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.body.enabled
    }

    /// Back to spawn position, shown, enabled and at rest
    pub fn reset(&mut self) {
        self.body.pos = self.origin;
        self.body.visible = true;
        self.body.enabled = true;
        self.body.stop_motion();
    }
}

impl HasBody for Prop {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// Which way a door takes the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoorKind {
    /// Needs (and consumes) a key
    Up,
    /// Needs the diamond, which is never consumed
    Down,
}

impl DoorKind {
    pub fn opposite(self) -> Self {
        match self {
            DoorKind::Up => DoorKind::Down,
            DoorKind::Down => DoorKind::Up,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Door {
    pub prop: Prop,
    pub kind: DoorKind,
    is_open: bool,
    is_final: bool,
}

impl Door {
    pub fn new(pos: Vec2, kind: DoorKind, is_open: bool) -> Self {
        Self {
            prop: Prop::new(Body::new(pos).immovable()),
            kind,
            is_open,
            is_final: false,
        }
    }

    /// The winning door: starts closed and never closes once open
    pub fn new_final(pos: Vec2) -> Self {
        Self {
            is_final: true,
            ..Self::new(pos, DoorKind::Down, false)
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        if !self.is_final {
            self.is_open = false;
        }
    }

    /// Resting sprite frame: up doors use 0-4, down doors 5-9
    pub fn frame(&self) -> u32 {
        let base = match self.kind {
            DoorKind::Up => 0,
            DoorKind::Down => 5,
        };
        if self.is_open { base + 4 } else { base }
    }
}

impl HasBody for Door {
    fn body(&self) -> &Body {
        &self.prop.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.prop.body
    }
}

/// Which wall of its quadrant a button sits against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ButtonSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl ButtonSide {
    /// Classify a sprite position by the nearest quadrant edge
    pub fn from_position(pos: Vec2) -> Self {
        let (tx, ty) = world_to_tile(pos);
        let half = HALF_NUM_TILES as i32;
        let local_x = tx.rem_euclid(half) as f32;
        let local_y = ty.rem_euclid(half) as f32;
        let centre = NUM_TILES as f32 / 4.0;

        let offset_x = (centre - local_x).abs();
        let offset_y = (centre - local_y).abs();
        if offset_x > offset_y {
            if local_x < centre {
                ButtonSide::Left
            } else {
                ButtonSide::Right
            }
        } else if local_y < centre {
            ButtonSide::Top
        } else {
            ButtonSide::Bottom
        }
    }

    /// Gravity this button applies, pointing at its own wall
    pub fn gravity(self) -> Vec2 {
        match self {
            ButtonSide::Left => Vec2::new(-BUTTON_GRAVITY, 0.0),
            ButtonSide::Right => Vec2::new(BUTTON_GRAVITY, 0.0),
            ButtonSide::Top => Vec2::new(0.0, -BUTTON_GRAVITY),
            ButtonSide::Bottom => Vec2::new(0.0, BUTTON_GRAVITY),
        }
    }

    pub fn rotation_deg(self) -> f32 {
        match self {
            ButtonSide::Left => 0.0,
            ButtonSide::Top => 90.0,
            ButtonSide::Right => 180.0,
            ButtonSide::Bottom => 270.0,
        }
    }

    /// Sprite frame for the unpressed/pressed state
    pub fn frame(self, pressed: bool) -> u32 {
        let base = match self {
            ButtonSide::Left => 0,
            ButtonSide::Top => 2,
            ButtonSide::Right => 4,
            ButtonSide::Bottom => 6,
        };
        base + u32::from(pressed)
    }

    /// Hit box (offset, size) hugging the wall side of the tile
    fn hit_box(self) -> (Vec2, Vec2) {
        let far = TILE_SIZE - BUTTON_HIT_DEPTH;
        match self {
            ButtonSide::Left => (Vec2::ZERO, Vec2::new(BUTTON_HIT_DEPTH, TILE_SIZE)),
            ButtonSide::Top => (Vec2::ZERO, Vec2::new(TILE_SIZE, BUTTON_HIT_DEPTH)),
            ButtonSide::Right => (Vec2::new(far, 0.0), Vec2::new(BUTTON_HIT_DEPTH, TILE_SIZE)),
            ButtonSide::Bottom => (Vec2::new(0.0, far), Vec2::new(TILE_SIZE, BUTTON_HIT_DEPTH)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    pub prop: Prop,
    pub side: ButtonSide,
    is_pressed: bool,
}

impl Button {
    pub fn new(pos: Vec2) -> Self {
        let side = ButtonSide::from_position(pos);
        let (offset, size) = side.hit_box();
        let mut body = Body::new(pos).immovable();
        body.offset = offset;
        body.size = size;
        Self {
            prop: Prop::new(body),
            side,
            is_pressed: false,
        }
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.is_pressed = pressed;
    }

    pub fn frame(&self) -> u32 {
        self.side.frame(self.is_pressed)
    }
}

impl HasBody for Button {
    fn body(&self) -> &Body {
        &self.prop.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.prop.body
    }
}
