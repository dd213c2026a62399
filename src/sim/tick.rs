//! Fixed timestep simulation tick
//!
//! One tick: integrate bodies, advance quadrant fades, run the collision
//! pass over the current layer of every visible quadrant, then read input.

use super::event::GameEvent;
use super::layer::DoorTransit;
use super::quadrant::{Direction, FadeAction, QuadrantId};
use super::state::GameState;

/// Held input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Charge (shift)
    pub charge: bool,
    /// Restart chord (ctrl+backspace)
    pub restart: bool,
    /// Debug: give the player a key
    pub grant_key: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    integrate(state, dt);

    for id in QuadrantId::ALL {
        if let Some(action) = state.ring.get_mut(id).update(dt) {
            handle_fade_action(state, id, action, &mut events);
        }
    }

    // Working set is fixed for the rest of the tick, even if a door
    // switches a quadrant's layer part way through
    let active = state.ring.active_layers();
    for &(id, index) in &active {
        let Some(layer) = state.ring.get_mut(id).layer_mut(index) else {
            continue;
        };
        if let Some(transit) = layer.collide_with_player(&mut state.player, &mut events) {
            handle_transit(state, id, transit, &mut events);
        }
        if let Some(layer) = state.ring.get_mut(id).layer_mut(index) {
            layer.collide_mobile_objects_together(&mut events);
        }

        for &(other_id, other_index) in &active {
            let Some(obstacles) = state
                .ring
                .get(other_id)
                .layer(other_index)
                .map(|l| l.obstacles())
            else {
                continue;
            };
            if let Some(layer) = state.ring.get_mut(id).layer_mut(index) {
                layer.collide_mobile_objects_with(&obstacles);
            }
        }
    }

    if !state.restarting {
        if input.restart && !state.ring.any_fading() {
            begin_restart(state, &mut events);
        } else {
            state.player.update(input, &mut events);
        }
    }

    for event in &events {
        if let GameEvent::CameraShake { offset } = event {
            state.start_camera_shake(*offset);
        }
    }
    state.apply_title(&events);
    state.time_ticks += 1;
    events
}

/// Physics step for the player and every mobile body in play
fn integrate(state: &mut GameState, dt: f32) {
    state.player.advance_timers(dt);
    state.player.body.integrate(dt);

    for (id, index) in state.ring.active_layers() {
        if let Some(layer) = state.ring.get_mut(id).layer_mut(index) {
            layer.mobile_bodies_mut().for_each(|b| b.integrate(dt));
        }
    }

    if let Some(shake) = &mut state.camera_shake {
        shake.advance(dt);
        if shake.is_finished() {
            state.camera_shake = None;
        }
    }
}

fn handle_transit(
    state: &mut GameState,
    from: QuadrantId,
    transit: DoorTransit,
    events: &mut Vec<GameEvent>,
) {
    let direction = match transit {
        DoorTransit::Win => {
            state.win(events);
            return;
        }
        DoorTransit::LevelUp => Direction::Up,
        DoorTransit::LevelDown => Direction::Down,
    };
    if state
        .ring
        .trigger_level_change(from, direction, events)
        .is_some()
    {
        state.player.set_map_entry_pos();
    }
}

fn handle_fade_action(
    state: &mut GameState,
    id: QuadrantId,
    action: FadeAction,
    events: &mut Vec<GameEvent>,
) {
    match action {
        FadeAction::ResetAfterRestart => {
            let is_current = id == state.ring.current_id();
            let quadrant = state.ring.get_mut(id);
            if is_current {
                quadrant.reset();
            }
            quadrant.fade_in(None, None);

            if is_current && state.restarting {
                state.player.reset();
                state.player.fade_in();
                state.restarting = false;
                log::info!("Restart finished in {}", id.name());
                events.push(GameEvent::RestartFinished);
            }
        }
    }
}

fn begin_restart(state: &mut GameState, events: &mut Vec<GameEvent>) {
    log::info!("Restarting {}", state.ring.current_id().name());
    state.restarting = true;
    state.ring.fade_out_visible(FadeAction::ResetAfterRestart);
    state.player.fade_out();
    events.push(GameEvent::RestartBegan);
}
