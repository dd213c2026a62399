//! Events emitted by the simulation for audio, effects and UI
//!
//! The sim never plays sounds or spawns particles itself. Each tick returns
//! the events that happened, in order, and the host decides what to do.

use glam::Vec2;
use serde::Serialize;

use super::objects::{ButtonSide, DoorKind};
use super::quadrant::QuadrantId;

/// Window/title text shown before and after the diamond
pub const TITLE_CLOCKWISE: &str = "Clockwise!";
pub const TITLE_ANTICLOCKWISE: &str = "Anticlockwise!";

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A charging player smashed a breakable wall
    WallBroken { pos: Vec2 },
    /// A charge ended against something solid
    ChargeHalted,
    /// Impact hard enough to shake the camera along `offset`
    CameraShake { offset: Vec2 },
    KeyCollected,
    DiamondCollected,
    TitleChanged { title: &'static str },
    DoorOpened { kind: DoorKind },
    /// A rock dropped into the hole at `pos`
    RockInHole { pos: Vec2 },
    GravityChanged { side: ButtonSide },
    LayerSwitched { quadrant: QuadrantId, layer: usize },
    CurrentQuadrantChanged { quadrant: QuadrantId },
    Won,
    RestartBegan,
    RestartFinished,
}

/// Named one-shot sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundEffect {
    BrokeWall,
    Charge,
    GetDiamond,
    GetKey,
    Gravity,
    OpenDoor,
    RockInHole,
}

impl SoundEffect {
    /// Asset key of the sound
    pub fn key(self) -> &'static str {
        match self {
            SoundEffect::BrokeWall => "broke-wall",
            SoundEffect::Charge => "charge",
            SoundEffect::GetDiamond => "get-diamond",
            SoundEffect::GetKey => "get-key",
            SoundEffect::Gravity => "gravity",
            SoundEffect::OpenDoor => "open-door",
            SoundEffect::RockInHole => "rock-in-hole",
        }
    }
}

impl GameEvent {
    /// Sound to play for this event, if any
    pub fn sound(&self) -> Option<SoundEffect> {
        match self {
            GameEvent::WallBroken { .. } => Some(SoundEffect::BrokeWall),
            GameEvent::ChargeHalted => Some(SoundEffect::Charge),
            GameEvent::KeyCollected => Some(SoundEffect::GetKey),
            GameEvent::DiamondCollected => Some(SoundEffect::GetDiamond),
            GameEvent::DoorOpened { .. } => Some(SoundEffect::OpenDoor),
            GameEvent::RockInHole { .. } => Some(SoundEffect::RockInHole),
            GameEvent::GravityChanged { .. } => Some(SoundEffect::Gravity),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sounds_use_asset_keys() {
        let ev = GameEvent::WallBroken { pos: Vec2::ZERO };
        assert_eq!(ev.sound().map(SoundEffect::key), Some("broke-wall"));
        assert_eq!(
            GameEvent::GravityChanged {
                side: ButtonSide::Top
            }
            .sound()
            .map(SoundEffect::key),
            Some("gravity")
        );
        assert_eq!(GameEvent::Won.sound(), None);
    }

    #[test]
    fn events_serialize_for_logging() {
        let json = serde_json::to_string(&GameEvent::DoorOpened { kind: DoorKind::Up }).unwrap();
        assert!(json.contains("DoorOpened"));
        assert!(json.contains("Up"));
    }
}
