//! Clockwise - a four-quadrant puzzle platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (quadrants, layers, player, collisions)
//! - `settings`: Runtime preferences loaded from JSON

pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Tile edge in pixels
    pub const TILE_SIZE: f32 = 32.0;
    /// Tiles per world dimension (the whole 2x2 quadrant world)
    pub const NUM_TILES: usize = 22;
    /// Tiles per quadrant dimension
    pub const HALF_NUM_TILES: usize = NUM_TILES / 2;

    /// Tile codes as they appear in the map data
    pub const TILE_EMPTY: u32 = 0;
    pub const TILE_WALL: u32 = 1;
    pub const TILE_WATER: u32 = 2;
    pub const TILE_DOOR_UP: u32 = 3;
    pub const TILE_DOOR_DOWN: u32 = 4;
    pub const TILE_BREAKABLE_WALL: u32 = 5;
    pub const TILE_HOLE: u32 = 6;
    pub const TILE_ROCK: u32 = 7;
    pub const TILE_FINAL_DOOR: u32 = 8;
    pub const TILE_DIAMOND: u32 = 9;
    pub const TILE_KEY: u32 = 10;
    pub const TILE_BUTTON: u32 = 11;

    /// Player movement
    pub const PLAYER_NORMAL_VEL: f32 = 200.0;
    pub const PLAYER_CHARGE_VEL: f32 = 400.0;
    pub const PLAYER_ACCELERATION: f32 = 1500.0;
    pub const PLAYER_DRAG: f32 = 1000.0;
    pub const PLAYER_BOUNCE: f32 = 0.2;
    pub const DIAG_FACTOR: f32 = 0.7071;
    /// Player collision box (narrower and shorter than the 32px sprite)
    pub const PLAYER_BODY_SIZE: (f32, f32) = (18.0, 24.0);
    pub const PLAYER_BODY_OFFSET: (f32, f32) = (7.0, 4.0);
    /// Where the player appears on a fresh game
    pub const PLAYER_START: (f32, f32) = (32.0, 32.0);
    /// Animation frame rates
    pub const WALK_ANIM_FPS: f32 = 10.0;
    pub const CHARGE_ANIM_FPS: f32 = 5.0;

    /// Charge / break
    pub const WALL_BREAK_VEL: f32 = 300.0;
    pub const CAMERA_SHAKE_VEL_SQ: f32 = 300.0 * 300.0;
    /// Seconds the player is stunned after a halted charge
    pub const STUN_DURATION: f32 = 0.5;
    pub const CAMERA_SHAKE_MAGNITUDE: f32 = 10.0;
    /// One half-swing of the camera shake (seconds)
    pub const CAMERA_SHAKE_STEP: f32 = 0.03;
    pub const CAMERA_SHAKE_REPEATS: u32 = 4;

    /// Rocks and holes
    pub const ROCK_DRAG: f32 = 100.0;
    pub const ROCK_BODY_SIZE: f32 = 28.0;
    pub const ROCK_BODY_OFFSET: f32 = 2.0;
    /// A rock closer than this (pixels) to a hole fills it
    pub const HOLE_FILL_DISTANCE: f32 = 5.0;
    /// Steering acceleration pulling an overlapping rock toward a hole
    pub const HOLE_PULL_ACCEL: f32 = 100.0;
    pub const HOLE_PULL_MAX_VEL: f32 = 500.0;

    /// Buttons
    pub const BUTTON_GRAVITY: f32 = 300.0;
    /// Thickness of a button's pressable strip
    pub const BUTTON_HIT_DEPTH: f32 = 14.0;

    /// Default velocity cap for loose objects
    pub const OBJECT_MAX_VEL: f32 = 10_000.0;

    /// Quadrant shadow fades (seconds)
    pub const FADE_OUT_DURATION: f32 = 2.0;
    pub const FADE_IN_DURATION: f32 = 0.75;
}

/// Tile coordinate containing a world position
#[inline]
pub fn world_to_tile(pos: Vec2) -> (i32, i32) {
    let tile = (pos / consts::TILE_SIZE).floor();
    (tile.x as i32, tile.y as i32)
}

/// World position of a tile's top-left corner
#[inline]
pub fn tile_to_world(x: usize, y: usize) -> Vec2 {
    Vec2::new(x as f32, y as f32) * consts::TILE_SIZE
}
