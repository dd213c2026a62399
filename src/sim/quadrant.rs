//! Map quadrants: a stack of layers plus the shadow fade
//!
//! A quadrant only knows its own layers. Moves that touch several quadrants
//! (linked layer shifts, fading neighbours) are driven by `QuadrantRing`.

use serde::{Deserialize, Serialize};

use super::layer::TileLayer;
use super::objects::DoorKind;
use super::tilemap::TileMap;
use super::tween::{Easing, Tween};
use crate::consts::{FADE_IN_DURATION, FADE_OUT_DURATION};

/// The four quadrants, in ring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuadrantId {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl QuadrantId {
    pub const ALL: [QuadrantId; 4] = [
        QuadrantId::TopLeft,
        QuadrantId::TopRight,
        QuadrantId::BottomRight,
        QuadrantId::BottomLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Map file stem, e.g. `top-left`
    pub fn name(self) -> &'static str {
        match self {
            QuadrantId::TopLeft => "top-left",
            QuadrantId::TopRight => "top-right",
            QuadrantId::BottomRight => "bottom-right",
            QuadrantId::BottomLeft => "bottom-left",
        }
    }
}

/// Neighbours of a quadrant in the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relations {
    pub next: QuadrantId,
    /// Diagonal partner whose layer moves in lockstep
    pub linked: QuadrantId,
    pub prev: QuadrantId,
}

impl Relations {
    pub fn of(id: QuadrantId) -> Self {
        let i = id.index();
        Self {
            next: QuadrantId::from_index(i + 1),
            linked: QuadrantId::from_index(i + 2),
            prev: QuadrantId::from_index(i + 3),
        }
    }
}

/// Per-quadrant switch suppression for asymmetric map seams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrantFlags {
    /// Swallow the first linked layer shift (one-shot)
    pub ignore_first_switch: bool,
    /// Don't shift the linked quadrant while on the top layer
    pub ignore_switch_on_last_layer: bool,
}

/// Suppression flags for all four quadrants, indexed by `QuadrantId`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology(pub [QuadrantFlags; 4]);

impl Default for Topology {
    fn default() -> Self {
        let seam = QuadrantFlags {
            ignore_first_switch: true,
            ignore_switch_on_last_layer: true,
        };
        Self([QuadrantFlags::default(), QuadrantFlags::default(), seam, seam])
    }
}

impl Topology {
    pub fn flags(&self, id: QuadrantId) -> QuadrantFlags {
        self.0[id.index()]
    }
}

/// Layer step direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Door kind whose use moves in this direction
    pub fn door_kind(self) -> DoorKind {
        match self {
            Direction::Up => DoorKind::Up,
            Direction::Down => DoorKind::Down,
        }
    }
}

/// What to do once a quadrant fade completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeAction {
    /// Restart finished fading out: reset and fade back in
    ResetAfterRestart,
}

#[derive(Debug, Clone)]
struct Fade {
    tween: Tween,
    on_complete: Option<FadeAction>,
}

#[derive(Debug, Clone)]
pub struct MapQuadrant {
    pub id: QuadrantId,
    pub relations: Relations,
    pub flags: QuadrantFlags,
    layers: Vec<TileLayer>,
    current_layer: usize,
    /// Last forced move of the linked quadrant was upward
    have_gone_up: bool,
    /// 0 = dark, 1 = fully lit
    shadow_alpha: f32,
    fade: Option<Fade>,
}

impl MapQuadrant {
    /// Build a quadrant from its map; starts on layer 0
    pub fn new(id: QuadrantId, map: TileMap, flags: QuadrantFlags, lit: bool) -> Self {
        let layers = map
            .layers
            .into_iter()
            .map(|(name, grid)| TileLayer::new(&format!("{}/{}", map.name, name), grid))
            .collect();
        let mut quadrant = Self {
            id,
            relations: Relations::of(id),
            flags,
            layers,
            current_layer: 0,
            have_gone_up: false,
            shadow_alpha: if lit { 1.0 } else { 0.0 },
            fade: None,
        };
        quadrant.switch_to(0);
        quadrant
    }

    #[inline]
    pub fn current_layer_index(&self) -> usize {
        self.current_layer
    }

    pub fn current_layer(&self) -> &TileLayer {
        &self.layers[self.current_layer]
    }

    pub fn current_layer_mut(&mut self) -> &mut TileLayer {
        &mut self.layers[self.current_layer]
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut TileLayer> {
        self.layers.get_mut(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn have_gone_up(&self) -> bool {
        self.have_gone_up
    }

    #[inline]
    pub fn shadow_alpha(&self) -> f32 {
        self.shadow_alpha
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.shadow_alpha > 0.0
    }

    #[inline]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Make `index` the only started layer. Out of range is a no-op.
    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        log::info!("{} switching to layer {}", self.id.name(), index);
        if let Some(layer) = self.layers.get_mut(self.current_layer) {
            layer.stop();
        }
        self.current_layer = index;
        self.layers[index].start();
        true
    }

    /// Shift one layer because the linked quadrant's door was used
    ///
    /// Returns the new layer index if the layer actually changed.
    pub fn adjust_layer(&mut self, direction: Direction) -> Option<usize> {
        if self.flags.ignore_first_switch {
            self.flags.ignore_first_switch = false;
            log::info!("{} ignoring first switch", self.id.name());
            return None;
        }

        let target = match direction {
            Direction::Up => {
                self.have_gone_up = false;
                (self.current_layer + 1 < self.layers.len()).then(|| self.current_layer + 1)
            }
            Direction::Down => {
                self.have_gone_up = true;
                self.current_layer.checked_sub(1)
            }
        };
        let target = target?;
        self.switch_to(target);
        Some(target)
    }

    /// Quadrant-local half of a level change
    ///
    /// Returns `None` when the guard rejects the move (already gone up, or
    /// not gone up for a down move). Otherwise `Some(propagate)`, where
    /// `propagate` says whether the linked quadrant should shift.
    pub fn begin_level_change(&mut self, direction: Direction) -> Option<bool> {
        match direction {
            Direction::Up if self.have_gone_up => return None,
            Direction::Down if !self.have_gone_up => return None,
            Direction::Up => self.have_gone_up = true,
            Direction::Down => self.have_gone_up = false,
        }
        let on_last = self.current_layer + 1 == self.layers.len();
        Some(!(self.flags.ignore_switch_on_last_layer && on_last))
    }

    fn start_fade(&mut self, to: f32, duration: f32, easing: Easing, on_complete: Option<FadeAction>) {
        self.fade = Some(Fade {
            tween: Tween::new(self.shadow_alpha, to, duration, easing),
            on_complete,
        });
    }

    /// Darken the quadrant, closing `close_kind` doors in its current layer
    pub fn fade_out(&mut self, close_kind: Option<DoorKind>, on_complete: Option<FadeAction>) {
        self.start_fade(0.0, FADE_OUT_DURATION, Easing::QuadraticOut, on_complete);
        if let Some(kind) = close_kind {
            self.current_layer_mut().adjust_doors(kind);
        }
    }

    /// Light the quadrant, closing `close_kind` doors in its current layer
    pub fn fade_in(&mut self, close_kind: Option<DoorKind>, on_complete: Option<FadeAction>) {
        self.start_fade(1.0, FADE_IN_DURATION, Easing::QuadraticIn, on_complete);
        if let Some(kind) = close_kind {
            self.current_layer_mut().adjust_doors(kind);
        }
    }

    /// Advance the shadow fade; returns the completion action when it ends
    pub fn update(&mut self, dt: f32) -> Option<FadeAction> {
        let fade = self.fade.as_mut()?;
        self.shadow_alpha = fade.tween.advance(dt);
        if !fade.tween.is_finished() {
            return None;
        }
        self.fade.take().and_then(|f| f.on_complete)
    }

    /// Reset the current layer's objects
    pub fn reset(&mut self) {
        self.current_layer_mut().reset();
    }
}
