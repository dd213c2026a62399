//! Game state and top-level game bookkeeping
//!
//! Everything the tick needs lives here: the quadrant ring, the player, and
//! the few pieces of whole-game state (title, win, restart, camera shake).

use glam::Vec2;

use super::event::{GameEvent, TITLE_CLOCKWISE};
use super::player::Player;
use super::quadrant::{QuadrantId, Topology};
use super::ring::QuadrantRing;
use super::tilemap::{MapError, TileMap};
use super::tween::CameraShake;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct GameState {
    pub ring: QuadrantRing,
    pub player: Player,
    /// Title text currently shown
    pub title: &'static str,
    /// The final door has been opened
    pub won: bool,
    /// A restart fade is in progress; player input is ignored
    pub restarting: bool,
    /// Shake camera on hard impacts
    pub screen_shake: bool,
    pub camera_shake: Option<CameraShake>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Build a new game from the four quadrant maps, in `QuadrantId::ALL` order
    pub fn new(maps: [TileMap; 4], topology: &Topology) -> Result<Self, MapError> {
        for map in &maps {
            map.validate()?;
        }
        let ring = QuadrantRing::new(maps, topology);

        let mut player = Player::new(Vec2::from(PLAYER_START));
        player.set_map_entry_pos();

        log::info!(
            "New game: layers per quadrant {:?}",
            ring.iter().map(|q| q.layer_count()).collect::<Vec<_>>()
        );

        Ok(Self {
            ring,
            player,
            title: TITLE_CLOCKWISE,
            won: false,
            restarting: false,
            screen_shake: true,
            camera_shake: None,
            time_ticks: 0,
        })
    }

    #[inline]
    pub fn current_quadrant(&self) -> QuadrantId {
        self.ring.current_id()
    }

    /// Camera offset from the running shake, if any
    pub fn camera_offset(&self) -> Vec2 {
        self.camera_shake
            .as_ref()
            .map_or(Vec2::ZERO, CameraShake::offset)
    }

    pub fn start_camera_shake(&mut self, offset: Vec2) {
        if self.screen_shake {
            self.camera_shake = Some(CameraShake::new(offset));
        }
    }

    pub fn win(&mut self, events: &mut Vec<GameEvent>) {
        if self.won {
            return;
        }
        log::info!("Final door opened after {} ticks", self.time_ticks);
        self.won = true;
        self.title = TITLE_CLOCKWISE;
        events.push(GameEvent::TitleChanged {
            title: TITLE_CLOCKWISE,
        });
        events.push(GameEvent::Won);
    }

    /// Apply title changes carried by events
    pub(crate) fn apply_title(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::TitleChanged { title } = event {
                self.title = *title;
            }
        }
    }
}
