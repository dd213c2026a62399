//! The player: movement, charge/stun, and inventory
//!
//! Charging is "held" state sampled once per tick. Breaking force is judged
//! on the velocity snapshot taken at the start of the previous update, since
//! collision response has already zeroed the live velocity by the time a
//! wall contact is reported.

use glam::Vec2;

use super::body::Body;
use super::event::{GameEvent, TITLE_ANTICLOCKWISE};
use super::objects::{Door, DoorKind, Prop};
use super::tick::TickInput;
use super::tween::{Easing, Tween};
use crate::consts::*;

/// Walk animation the renderer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Down,
    Up,
    Right,
    Left,
}

impl Facing {
    /// Sprite sheet frames of the walk cycle
    pub fn frames(self) -> [u32; 4] {
        match self {
            Facing::Down => [0, 1, 2, 3],
            Facing::Up => [4, 5, 6, 7],
            Facing::Right => [8, 9, 10, 11],
            Facing::Left => [12, 13, 14, 15],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub is_charging: bool,
    stun_remaining: f32,
    /// Velocity at the start of the last update
    pub prev_vel: Vec2,
    pub has_key: bool,
    pub has_diamond: bool,
    map_entry_pos: Option<Vec2>,
    /// Current walk animation; `None` when standing still
    pub facing: Option<Facing>,
    pub anim_fps: f32,
    /// Sprite opacity, faded during a restart
    pub alpha: f32,
    alpha_tween: Option<Tween>,
    /// Diamond sparkle trail enabled
    pub sparkle: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        let mut body = Body::new(pos);
        body.size = Vec2::from(PLAYER_BODY_SIZE);
        body.offset = Vec2::from(PLAYER_BODY_OFFSET);
        body.drag = Vec2::splat(PLAYER_DRAG);
        body.bounce = Vec2::splat(PLAYER_BOUNCE);
        body.max_vel = Vec2::splat(PLAYER_NORMAL_VEL);
        Self {
            body,
            is_charging: false,
            stun_remaining: 0.0,
            prev_vel: Vec2::ZERO,
            has_key: false,
            has_diamond: false,
            map_entry_pos: None,
            facing: None,
            anim_fps: WALK_ANIM_FPS,
            alpha: 1.0,
            alpha_tween: None,
            sparkle: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn map_entry_pos(&self) -> Option<Vec2> {
        self.map_entry_pos
    }

    /// Count down the stun and advance the restart fade
    pub fn advance_timers(&mut self, dt: f32) {
        if self.stun_remaining > 0.0 {
            self.stun_remaining = (self.stun_remaining - dt).max(0.0);
        }
        if let Some(tween) = &mut self.alpha_tween {
            self.alpha = tween.advance(dt);
            if tween.is_finished() {
                self.alpha_tween = None;
            }
        }
    }

    /// Turn held input into acceleration, speed cap and animation
    pub fn update(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        self.prev_vel = self.body.vel;
        self.body.accel = Vec2::ZERO;

        if !self.is_stunned() {
            self.is_charging = input.charge;

            let mut accel = Vec2::ZERO;
            let mut facing = None;
            if input.up {
                accel.y = -PLAYER_ACCELERATION;
                facing = Some(Facing::Up);
            } else if input.down {
                accel.y = PLAYER_ACCELERATION;
                facing = Some(Facing::Down);
            }
            // Horizontal second: its animation wins on diagonals
            if input.right {
                accel.x = PLAYER_ACCELERATION;
                facing = Some(Facing::Right);
            } else if input.left {
                accel.x = -PLAYER_ACCELERATION;
                facing = Some(Facing::Left);
            }
            self.facing = facing;
            self.anim_fps = if self.is_charging {
                CHARGE_ANIM_FPS
            } else {
                WALK_ANIM_FPS
            };

            let diagonal = accel.x != 0.0 && accel.y != 0.0;
            let mut max_vel = if self.is_charging {
                PLAYER_CHARGE_VEL
            } else {
                PLAYER_NORMAL_VEL
            };
            if diagonal {
                accel *= DIAG_FACTOR;
                max_vel *= DIAG_FACTOR;
            }
            self.body.accel = accel;
            self.body.max_vel = Vec2::splat(max_vel);
        }

        if input.grant_key && !self.has_key {
            log::debug!("Debug key granted");
            self.grant_key(events);
        }
    }

    /// End a charge with a thump: stun, and shake the camera on hard hits
    pub fn halt_charge(&mut self, events: &mut Vec<GameEvent>) {
        if !self.is_charging {
            return;
        }
        self.is_charging = false;
        self.stun_remaining = STUN_DURATION;
        events.push(GameEvent::ChargeHalted);

        if self.prev_vel.length_squared() >= CAMERA_SHAKE_VEL_SQ {
            events.push(GameEvent::CameraShake {
                offset: self.prev_vel.normalize_or_zero() * CAMERA_SHAKE_MAGNITUDE,
            });
        }
    }

    /// Was the player charging at `target` hard enough to break it?
    pub fn can_break(&self, target: Vec2) -> bool {
        if !self.is_charging {
            return false;
        }
        let dir = (target - self.body.pos).normalize_or_zero();
        self.prev_vel.dot(dir) >= WALL_BREAK_VEL
    }

    fn grant_key(&mut self, events: &mut Vec<GameEvent>) {
        self.has_key = true;
        events.push(GameEvent::KeyCollected);
    }

    pub fn collect_key(&mut self, key: &mut Prop, events: &mut Vec<GameEvent>) {
        key.hide();
        self.grant_key(events);
    }

    pub fn use_key(&mut self) {
        self.has_key = false;
    }

    pub fn collect_diamond(&mut self, diamond: &mut Prop, events: &mut Vec<GameEvent>) {
        diamond.hide();
        self.has_diamond = true;
        self.sparkle = true;
        events.push(GameEvent::DiamondCollected);
        events.push(GameEvent::TitleChanged {
            title: TITLE_ANTICLOCKWISE,
        });
    }

    /// Try to open a door. Up doors take the key, down doors need the diamond.
    pub fn open_door(&mut self, door: &mut Door, events: &mut Vec<GameEvent>) -> bool {
        let allowed = match door.kind {
            DoorKind::Up => self.has_key,
            DoorKind::Down => self.has_diamond,
        };
        if !allowed {
            return false;
        }
        door.open();
        if door.kind == DoorKind::Up {
            self.use_key();
        }
        events.push(GameEvent::DoorOpened { kind: door.kind });
        true
    }

    /// Remember where the player entered the current quadrant
    pub fn set_map_entry_pos(&mut self) {
        self.map_entry_pos = Some(self.body.pos);
    }

    /// Respawn at the quadrant entry point. The diamond is kept.
    pub fn reset(&mut self) {
        if let Some(pos) = self.map_entry_pos {
            self.body.pos = pos;
        }
        self.body.vel = Vec2::ZERO;
        self.body.accel = Vec2::ZERO;
        self.has_key = false;
    }

    pub fn fade_out(&mut self) {
        self.body.accel = Vec2::ZERO;
        self.alpha_tween = Some(Tween::new(
            self.alpha,
            0.0,
            FADE_OUT_DURATION,
            Easing::QuadraticOut,
        ));
    }

    pub fn fade_in(&mut self) {
        self.alpha_tween = Some(Tween::new(
            self.alpha,
            1.0,
            FADE_IN_DURATION,
            Easing::QuadraticIn,
        ));
    }

    pub fn is_fading(&self) -> bool {
        self.alpha_tween.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn charging_player(prev_vel: Vec2) -> Player {
        let mut player = Player::new(Vec2::new(32.0, 32.0));
        player.is_charging = true;
        player.prev_vel = prev_vel;
        player
    }

    #[test]
    fn walk_cycles_use_consecutive_sheet_rows() {
        let table = [
            (Facing::Down, [0, 1, 2, 3]),
            (Facing::Up, [4, 5, 6, 7]),
            (Facing::Right, [8, 9, 10, 11]),
            (Facing::Left, [12, 13, 14, 15]),
        ];
        for (facing, frames) in table {
            assert_eq!(facing.frames(), frames, "{facing:?}");
        }
    }

    #[test]
    fn diagonal_input_scales_accel_and_cap() {
        let mut player = Player::new(Vec2::ZERO);
        let input = TickInput {
            up: true,
            right: true,
            ..Default::default()
        };
        player.update(&input, &mut Vec::new());
        let expected = PLAYER_ACCELERATION * DIAG_FACTOR;
        assert!((player.body.accel.x - expected).abs() < 1e-3);
        assert!((player.body.accel.y + expected).abs() < 1e-3);
        assert!((player.body.max_vel.x - PLAYER_NORMAL_VEL * DIAG_FACTOR).abs() < 1e-3);
        assert_eq!(player.facing, Some(Facing::Right));
    }

    #[test]
    fn charging_raises_speed_cap() {
        let mut player = Player::new(Vec2::ZERO);
        let input = TickInput {
            left: true,
            charge: true,
            ..Default::default()
        };
        player.update(&input, &mut Vec::new());
        assert!(player.is_charging);
        assert_eq!(player.body.max_vel, Vec2::splat(PLAYER_CHARGE_VEL));
        assert_eq!(player.anim_fps, CHARGE_ANIM_FPS);
    }

    #[test]
    fn break_threshold_is_inclusive() {
        let target = Vec2::new(64.0, 32.0);
        assert!(!charging_player(Vec2::new(299.999, 0.0)).can_break(target));
        assert!(charging_player(Vec2::new(300.0, 0.0)).can_break(target));

        let mut idle = charging_player(Vec2::new(1000.0, 0.0));
        idle.is_charging = false;
        assert!(!idle.can_break(target));
    }

    #[test]
    fn halt_charge_stuns_and_shakes_on_hard_hits() {
        let mut events = Vec::new();
        let mut player = charging_player(Vec2::new(300.0, 0.0));
        player.halt_charge(&mut events);
        assert!(!player.is_charging);
        assert!(player.is_stunned());
        assert_eq!(events[0], GameEvent::ChargeHalted);
        assert_eq!(
            events[1],
            GameEvent::CameraShake {
                offset: Vec2::new(CAMERA_SHAKE_MAGNITUDE, 0.0)
            }
        );

        // A second halt is a no-op
        events.clear();
        player.halt_charge(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn soft_halt_skips_camera_shake() {
        let mut events = Vec::new();
        let mut player = charging_player(Vec2::new(100.0, 0.0));
        player.halt_charge(&mut events);
        assert_eq!(events, vec![GameEvent::ChargeHalted]);
    }

    #[test]
    fn stun_blocks_input_until_it_expires() {
        let mut player = charging_player(Vec2::ZERO);
        player.halt_charge(&mut Vec::new());
        let input = TickInput {
            right: true,
            charge: true,
            ..Default::default()
        };
        player.update(&input, &mut Vec::new());
        assert_eq!(player.body.accel, Vec2::ZERO);
        assert!(!player.is_charging);

        for _ in 0..31 {
            player.advance_timers(SIM_DT);
        }
        assert!(!player.is_stunned());
        player.update(&input, &mut Vec::new());
        assert!(player.is_charging);
        assert!(player.body.accel.x > 0.0);
    }

    #[test]
    fn doors_need_the_right_item() {
        let mut events = Vec::new();
        let mut player = Player::new(Vec2::ZERO);
        let mut up = Door::new(Vec2::ZERO, DoorKind::Up, false);
        assert!(!player.open_door(&mut up, &mut events));
        assert!(!up.is_open());
        assert!(events.is_empty());

        player.has_key = true;
        assert!(player.open_door(&mut up, &mut events));
        assert!(up.is_open());
        assert!(!player.has_key);

        let mut down = Door::new(Vec2::ZERO, DoorKind::Down, false);
        player.has_diamond = true;
        assert!(player.open_door(&mut down, &mut events));
        assert!(player.has_diamond);
    }

    #[test]
    fn reset_keeps_diamond_but_drops_key() {
        let mut player = Player::new(Vec2::new(32.0, 32.0));
        player.set_map_entry_pos();
        player.body.pos = Vec2::new(200.0, 100.0);
        player.has_key = true;
        player.has_diamond = true;
        player.reset();
        assert_eq!(player.pos(), Vec2::new(32.0, 32.0));
        assert!(!player.has_key);
        assert!(player.has_diamond);
    }

    #[test]
    fn debug_key_is_granted_once() {
        let mut events = Vec::new();
        let mut player = Player::new(Vec2::ZERO);
        let input = TickInput {
            grant_key: true,
            ..Default::default()
        };
        player.update(&input, &mut events);
        player.update(&input, &mut events);
        assert!(player.has_key);
        assert_eq!(events, vec![GameEvent::KeyCollected]);
    }

    proptest! {
        #[test]
        fn can_break_matches_projected_speed(vx in -600.0f32..600.0, vy in -600.0f32..600.0) {
            let player = charging_player(Vec2::new(vx, vy));
            let target = player.pos() + Vec2::new(32.0, 0.0);
            prop_assert_eq!(player.can_break(target), vx >= WALL_BREAK_VEL);
        }
    }
}
