//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (ring order for quadrants, row-major for objects)
//! - No rendering or audio dependencies

pub mod body;
pub mod collision;
pub mod event;
pub mod layer;
pub mod objects;
pub mod player;
pub mod quadrant;
pub mod ring;
pub mod state;
pub mod tick;
pub mod tilemap;
pub mod tween;

pub use body::{Aabb, Body};
pub use event::{GameEvent, SoundEffect};
pub use layer::{DoorTransit, Obstacles, TileLayer};
pub use objects::{Button, ButtonSide, Door, DoorKind, Prop};
pub use player::{Facing, Player};
pub use quadrant::{Direction, FadeAction, MapQuadrant, QuadrantFlags, QuadrantId, Topology};
pub use ring::QuadrantRing;
pub use state::GameState;
pub use tick::{TickInput, tick};
pub use tilemap::{MapError, TileGrid, TileMap};
