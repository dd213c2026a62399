//! One selectable layer of a quadrant
//!
//! A layer owns the objects spawned from its tile grid, grouped by role, and
//! resolves every collision that involves them. Anything that has to reach
//! beyond the layer (a level change, a win) is handed back to the caller as a
//! `DoorTransit` instead of being acted on here.

use std::rc::Rc;

use glam::Vec2;

use super::body::{Aabb, Body};
use super::collision::{
    collide_body_with_group, collide_group_with_boxes, collide_group_with_grid,
    collide_group_with_itself, collide_groups, collide_with_grid, overlap_body_with_group,
    overlaps, separate,
};
use super::event::GameEvent;
use super::objects::{Button, Door, DoorKind, Prop};
use super::player::Player;
use super::tilemap::TileGrid;
use crate::consts::*;
use crate::tile_to_world;

/// What the player's door contact asks the quadrant ring to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorTransit {
    /// Took an up door
    LevelUp,
    /// Took a regular down door
    LevelDown,
    /// Took the final door
    Win,
}

/// Static obstacles a layer presents to the mobile objects of any layer
///
/// Captured by value so a layer can be collided against its own snapshot.
#[derive(Debug, Clone)]
pub struct Obstacles {
    pub walls: Rc<TileGrid>,
    pub breakable_walls: Vec<Aabb>,
    pub rocks: Vec<Aabb>,
    pub closed_doors: Vec<Aabb>,
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    /// Tile grid; WALL cells are the static collidable tiles
    pub walls: Rc<TileGrid>,
    pub water: Vec<Prop>,
    pub breakable_walls: Vec<Prop>,
    pub holes: Vec<Prop>,
    pub rocks: Vec<Prop>,
    pub keys: Vec<Prop>,
    pub diamonds: Vec<Prop>,
    pub doors_up: Vec<Door>,
    /// Regular down doors, then final doors
    pub doors_down: Vec<Door>,
    pub buttons: Vec<Button>,
    started: bool,
}

fn active_boxes(props: &[Prop]) -> Vec<Aabb> {
    props
        .iter()
        .filter(|p| p.is_active())
        .map(|p| p.body.bounds())
        .collect()
}

fn spawn<T>(grid: &TileGrid, code: u32, make: impl Fn(Vec2) -> T) -> Vec<T> {
    grid.positions_of(code)
        .map(|(x, y)| make(tile_to_world(x, y)))
        .collect()
}

impl TileLayer {
    /// Build a layer from its grid, spawning one object per special tile
    pub fn new(name: &str, grid: TileGrid) -> Self {
        let water = spawn(&grid, TILE_WATER, |p| Prop::new(Body::new(p).immovable()));
        let breakable_walls = spawn(&grid, TILE_BREAKABLE_WALL, |p| {
            Prop::new(Body::new(p).immovable())
        });
        let holes = spawn(&grid, TILE_HOLE, |p| Prop::new(Body::new(p).immovable()));
        let buttons = spawn(&grid, TILE_BUTTON, Button::new);
        let keys = spawn(&grid, TILE_KEY, |p| Prop::new(Body::new(p)));
        let diamonds = spawn(&grid, TILE_DIAMOND, |p| Prop::new(Body::new(p)));
        let rocks = spawn(&grid, TILE_ROCK, |p| {
            let mut body = Body::new(p);
            body.drag = Vec2::splat(ROCK_DRAG);
            body.size = Vec2::splat(ROCK_BODY_SIZE);
            body.offset = Vec2::splat(ROCK_BODY_OFFSET);
            Prop::new(body)
        });

        let doors_up = spawn(&grid, TILE_DOOR_UP, |p| Door::new(p, DoorKind::Up, false));
        let mut doors_down = spawn(&grid, TILE_DOOR_DOWN, |p| Door::new(p, DoorKind::Down, true));
        let finals: Vec<Vec2> = grid
            .positions_of(TILE_FINAL_DOOR)
            .map(|(x, y)| tile_to_world(x, y))
            .collect();
        // Only the last final tile is the real final door
        if let Some((last, rest)) = finals.split_last() {
            doors_down.extend(rest.iter().map(|&p| Door::new(p, DoorKind::Down, true)));
            doors_down.push(Door::new_final(*last));
        }

        log::debug!(
            "Layer '{}': {} rocks, {} holes, {} keys, {} diamonds, {} up doors, {} down doors, {} buttons",
            name,
            rocks.len(),
            holes.len(),
            keys.len(),
            diamonds.len(),
            doors_up.len(),
            doors_down.len(),
            buttons.len()
        );

        Self {
            name: name.to_string(),
            walls: Rc::new(grid),
            water,
            breakable_walls,
            holes,
            rocks,
            keys,
            diamonds,
            doors_up,
            doors_down,
            buttons,
            started: false,
        }
    }

    /// Show the layer and let it take part in collisions
    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn stop(&mut self) {
        self.started = false;
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Every resettable object in the layer
    pub fn props(&self) -> impl Iterator<Item = &Prop> {
        self.water
            .iter()
            .chain(&self.breakable_walls)
            .chain(&self.holes)
            .chain(&self.rocks)
            .chain(&self.keys)
            .chain(&self.diamonds)
            .chain(self.doors_up.iter().map(|d| &d.prop))
            .chain(self.doors_down.iter().map(|d| &d.prop))
            .chain(self.buttons.iter().map(|b| &b.prop))
    }

    fn props_mut(&mut self) -> impl Iterator<Item = &mut Prop> {
        self.water
            .iter_mut()
            .chain(&mut self.breakable_walls)
            .chain(&mut self.holes)
            .chain(&mut self.rocks)
            .chain(&mut self.keys)
            .chain(&mut self.diamonds)
            .chain(self.doors_up.iter_mut().map(|d| &mut d.prop))
            .chain(self.doors_down.iter_mut().map(|d| &mut d.prop))
            .chain(self.buttons.iter_mut().map(|b| &mut b.prop))
    }

    /// Bodies that move on their own and need integrating each tick
    pub fn mobile_bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.rocks
            .iter_mut()
            .chain(&mut self.keys)
            .chain(&mut self.diamonds)
            .map(|p| &mut p.body)
    }

    /// Resolve the player against everything in this layer
    ///
    /// Order matters: walls, breakable walls, holes, rocks, keys, diamonds,
    /// up doors, down doors, buttons, water.
    pub fn collide_with_player(
        &mut self,
        player: &mut Player,
        events: &mut Vec<GameEvent>,
    ) -> Option<DoorTransit> {
        if collide_with_grid(&mut player.body, &self.walls) {
            player.halt_charge(events);
        }

        for wall in &mut self.breakable_walls {
            if !separate(&mut player.body, &mut wall.body) {
                continue;
            }
            let breaks = player.can_break(wall.pos());
            player.halt_charge(events);
            if breaks {
                log::debug!("Wall broken at {:?}", wall.pos());
                wall.hide();
                events.push(GameEvent::WallBroken { pos: wall.pos() });
            }
        }

        collide_body_with_group(&mut player.body, &mut self.holes, |_| true);
        collide_body_with_group(&mut player.body, &mut self.rocks, |_| true);

        for i in collide_body_with_group(&mut player.body, &mut self.keys, |_| true) {
            player.collect_key(&mut self.keys[i], events);
        }
        for i in collide_body_with_group(&mut player.body, &mut self.diamonds, |_| true) {
            player.collect_diamond(&mut self.diamonds[i], events);
        }

        let mut transit = None;
        for i in collide_body_with_group(&mut player.body, &mut self.doors_up, |d| !d.is_open()) {
            if transit.is_none() && player.open_door(&mut self.doors_up[i], events) {
                transit = Some(DoorTransit::LevelUp);
                self.doors_down.iter_mut().for_each(Door::close);
            }
        }
        for i in collide_body_with_group(&mut player.body, &mut self.doors_down, |d| !d.is_open()) {
            if transit.is_none() && player.open_door(&mut self.doors_down[i], events) {
                if self.doors_down[i].is_final() {
                    transit = Some(DoorTransit::Win);
                } else {
                    transit = Some(DoorTransit::LevelDown);
                    self.doors_up.iter_mut().for_each(Door::close);
                }
            }
        }

        for i in overlap_body_with_group(&player.body, &self.buttons) {
            self.press_button(i, events);
        }

        collide_body_with_group(&mut player.body, &mut self.water, |_| true);
        transit
    }

    /// Snapshot of what this layer blocks mobile objects with
    pub fn obstacles(&self) -> Obstacles {
        Obstacles {
            walls: Rc::clone(&self.walls),
            breakable_walls: active_boxes(&self.breakable_walls),
            rocks: active_boxes(&self.rocks),
            closed_doors: self.closed_door_boxes(),
        }
    }

    fn closed_door_boxes(&self) -> Vec<Aabb> {
        self.doors_up
            .iter()
            .chain(&self.doors_down)
            .filter(|d| !d.is_open() && d.prop.is_active())
            .map(|d| d.prop.body.bounds())
            .collect()
    }

    /// Block this layer's rocks, keys and diamonds with another layer's
    /// obstacles (or this layer's own)
    pub fn collide_mobile_objects_with(&mut self, other: &Obstacles) {
        collide_group_with_grid(&mut self.rocks, &other.walls);
        collide_group_with_boxes(&mut self.rocks, &other.breakable_walls);
        collide_group_with_boxes(&mut self.rocks, &other.closed_doors);

        collide_group_with_grid(&mut self.keys, &other.walls);
        collide_group_with_boxes(&mut self.keys, &other.breakable_walls);
        collide_group_with_boxes(&mut self.keys, &other.rocks);
        collide_group_with_boxes(&mut self.keys, &other.closed_doors);

        collide_group_with_grid(&mut self.diamonds, &other.walls);
        collide_group_with_boxes(&mut self.diamonds, &other.breakable_walls);
    }

    /// Interactions between objects of this layer
    pub fn collide_mobile_objects_together(&mut self, events: &mut Vec<GameEvent>) {
        for rock in &mut self.rocks {
            for hole in &mut self.holes {
                if !overlaps(&rock.body, &hole.body) {
                    continue;
                }
                if rock.pos().distance(hole.pos()) < HOLE_FILL_DISTANCE {
                    log::debug!("Hole filled at {:?}", hole.pos());
                    rock.hide();
                    hole.hide();
                    events.push(GameEvent::RockInHole { pos: hole.pos() });
                    break;
                }
                rock.body.accelerate_toward(hole.pos(), HOLE_PULL_ACCEL, HOLE_PULL_MAX_VEL);
            }
        }

        collide_group_with_itself(&mut self.rocks);
        collide_groups(&mut self.rocks, &mut self.keys);

        let closed = self.closed_door_boxes();
        collide_group_with_boxes(&mut self.rocks, &closed);
        collide_group_with_boxes(&mut self.keys, &closed);
    }

    /// Press a button: redirect this layer's gravity toward its wall
    pub fn press_button(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        let Some(button) = self.buttons.get(index) else {
            return;
        };
        if button.is_pressed() {
            return;
        }
        let side = button.side;
        let gravity = side.gravity();
        for body in self.mobile_bodies_mut() {
            body.gravity = gravity;
        }
        for (i, other) in self.buttons.iter_mut().enumerate() {
            other.set_pressed(i == index);
        }
        log::debug!("Layer '{}' gravity now {:?}", self.name, side);
        events.push(GameEvent::GravityChanged { side });
    }

    /// Close doors of `close_kind` and open the other kind (never the final door)
    pub fn adjust_doors(&mut self, close_kind: DoorKind) {
        let (close, open) = match close_kind {
            DoorKind::Up => (&mut self.doors_up, &mut self.doors_down),
            DoorKind::Down => (&mut self.doors_down, &mut self.doors_up),
        };
        close.iter_mut().for_each(Door::close);
        open.iter_mut()
            .filter(|d| !d.is_final())
            .for_each(Door::open);
    }

    /// Put every object back where it spawned and release all buttons
    pub fn reset(&mut self) {
        self.props_mut().for_each(Prop::reset);
        for button in &mut self.buttons {
            button.set_pressed(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layer(rows: &[&str]) -> TileLayer {
        TileLayer::new("test", TileGrid::from_ascii(rows).unwrap())
    }

    #[test]
    fn spawns_objects_by_role() {
        let l = layer(&["#~UD", "BORF", "*KP."]);
        assert_eq!(l.water.len(), 1);
        assert_eq!(l.breakable_walls.len(), 1);
        assert_eq!(l.holes.len(), 1);
        assert_eq!(l.rocks.len(), 1);
        assert_eq!(l.keys.len(), 1);
        assert_eq!(l.diamonds.len(), 1);
        assert_eq!(l.buttons.len(), 1);
        assert!(!l.doors_up[0].is_open());
        assert_eq!(l.doors_down.len(), 2);
        assert!(l.doors_down[0].is_open());
        assert!(l.doors_down[1].is_final());
        assert!(!l.doors_down[1].is_open());
        assert_eq!(l.rocks[0].body.bounds().size(), Vec2::splat(28.0));
        assert!(!l.is_started());
    }

    #[test]
    fn only_the_last_final_tile_is_final() {
        let l = layer(&["F.F"]);
        assert_eq!(l.doors_down.len(), 2);
        assert!(!l.doors_down[0].is_final());
        assert!(l.doors_down[0].is_open());
        assert!(l.doors_down[1].is_final());
    }

    #[test]
    fn adjust_doors_never_opens_or_closes_the_final_door() {
        let mut l = layer(&["UDF"]);
        l.adjust_doors(DoorKind::Up);
        assert!(!l.doors_up[0].is_open());
        assert!(l.doors_down[0].is_open());
        assert!(!l.doors_down[1].is_open());

        l.doors_down[1].open();
        l.adjust_doors(DoorKind::Down);
        assert!(l.doors_up[0].is_open());
        assert!(!l.doors_down[0].is_open());
        assert!(l.doors_down[1].is_open());
    }

    #[test]
    fn rock_close_to_hole_fills_it() {
        let mut l = layer(&["O...", "...."]);
        let mut rock = Body::new(Vec2::new(4.0, 0.0));
        rock.size = Vec2::splat(ROCK_BODY_SIZE);
        rock.offset = Vec2::splat(ROCK_BODY_OFFSET);
        l.rocks.push(Prop::new(rock));

        let mut events = Vec::new();
        l.collide_mobile_objects_together(&mut events);
        assert!(!l.rocks[0].is_active());
        assert!(!l.holes[0].is_active());
        assert!(!l.rocks[0].body.visible);
        assert_eq!(l.rocks[0].body.accel, Vec2::ZERO);
        assert_eq!(events, vec![GameEvent::RockInHole { pos: Vec2::ZERO }]);
    }

    #[test]
    fn rock_near_hole_is_pulled_in() {
        let mut l = layer(&["O...", "...."]);
        let mut rock = Body::new(Vec2::new(6.0, 0.0));
        rock.size = Vec2::splat(ROCK_BODY_SIZE);
        rock.offset = Vec2::splat(ROCK_BODY_OFFSET);
        l.rocks.push(Prop::new(rock));

        let mut events = Vec::new();
        l.collide_mobile_objects_together(&mut events);
        assert!(l.rocks[0].is_active());
        assert!(l.holes[0].is_active());
        assert!(l.rocks[0].body.accel.x < 0.0);
        assert_eq!(l.rocks[0].body.max_vel, Vec2::splat(HOLE_PULL_MAX_VEL));
        assert!(events.is_empty());
    }

    #[test]
    fn pressing_buttons_redirects_layer_gravity() {
        // Buttons against the left and right quadrant walls
        let rows = [
            "RK*........",
            "...........",
            "...........",
            "...........",
            "...........",
            ".P.......P.",
        ];
        let mut l = layer(&rows);
        let mut other = layer(&rows);
        let mut events = Vec::new();

        l.press_button(0, &mut events);
        assert!(l.buttons[0].is_pressed());
        for body in l.mobile_bodies_mut() {
            assert_eq!(body.gravity, Vec2::new(-BUTTON_GRAVITY, 0.0));
        }

        l.press_button(1, &mut events);
        assert!(!l.buttons[0].is_pressed());
        assert!(l.buttons[1].is_pressed());
        for body in l.mobile_bodies_mut() {
            assert_eq!(body.gravity, Vec2::new(BUTTON_GRAVITY, 0.0));
        }
        for body in other.mobile_bodies_mut() {
            assert_eq!(body.gravity, Vec2::ZERO);
        }
        assert_eq!(events.len(), 2);

        // Re-pressing is silent
        l.press_button(1, &mut events);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn rocks_are_blocked_by_another_layers_walls() {
        let mut mine = layer(&["R.", ".."]);
        let theirs = layer(&[".#", ".."]);
        mine.rocks[0].body.pos.x = 10.0;
        mine.rocks[0].body.vel.x = 100.0;
        mine.collide_mobile_objects_with(&theirs.obstacles());
        assert!(mine.rocks[0].body.bounds().max.x <= 32.0 + 1e-4);
    }

    #[test]
    fn keys_are_blocked_by_another_layers_closed_doors() {
        let mut mine = layer(&["K.", ".."]);
        let theirs = layer(&[".U", ".."]);
        mine.keys[0].body.pos.x = 10.0;
        mine.collide_mobile_objects_with(&theirs.obstacles());
        assert!(mine.keys[0].body.bounds().max.x <= 32.0 + 1e-4);
    }

    #[test]
    fn keys_are_blocked_by_another_layers_rocks() {
        let mut mine = layer(&["K.", ".."]);
        let theirs = layer(&[".R", ".."]);
        mine.keys[0].body.pos.x = 10.0;
        mine.collide_mobile_objects_with(&theirs.obstacles());
        let rock_left = theirs.rocks[0].body.bounds().min.x;
        assert!(mine.keys[0].body.bounds().max.x <= rock_left + 1e-4);
        // Their rock does not move
        assert_eq!(theirs.rocks[0].pos(), Vec2::new(32.0, 0.0));
    }

    #[test]
    fn diamonds_pass_another_layers_closed_doors() {
        let mut mine = layer(&["*.", ".."]);
        let theirs = layer(&[".U", ".."]);
        mine.diamonds[0].body.pos.x = 10.0;
        mine.collide_mobile_objects_with(&theirs.obstacles());
        assert_eq!(mine.diamonds[0].pos(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn open_doors_do_not_block_objects() {
        let mut l = layer(&["KD"]);
        l.keys[0].body.pos.x = 10.0;
        l.collide_mobile_objects_together(&mut Vec::new());
        assert_eq!(l.keys[0].pos().x, 10.0);

        l.doors_down[0].close();
        l.collide_mobile_objects_together(&mut Vec::new());
        assert!(l.keys[0].body.bounds().max.x <= 32.0 + 1e-4);
    }

    #[test]
    fn player_without_key_bounces_off_up_door() {
        let mut l = layer(&[".U"]);
        let mut player = Player::new(Vec2::new(10.0, 0.0));
        let mut events = Vec::new();
        let transit = l.collide_with_player(&mut player, &mut events);
        assert_eq!(transit, None);
        assert!(!l.doors_up[0].is_open());
        assert!(events.is_empty());
    }

    #[test]
    fn player_with_key_opens_up_door() {
        let mut l = layer(&[".UD"]);
        let mut player = Player::new(Vec2::new(10.0, 0.0));
        player.has_key = true;
        let mut events = Vec::new();
        let transit = l.collide_with_player(&mut player, &mut events);
        assert_eq!(transit, Some(DoorTransit::LevelUp));
        assert!(l.doors_up[0].is_open());
        assert!(!l.doors_down[0].is_open());
        assert!(!player.has_key);
        assert_eq!(events, vec![GameEvent::DoorOpened { kind: DoorKind::Up }]);
    }

    #[test]
    fn final_door_wins() {
        let mut l = layer(&[".F"]);
        let mut player = Player::new(Vec2::new(10.0, 0.0));
        player.has_diamond = true;
        let transit = l.collide_with_player(&mut player, &mut Vec::new());
        assert_eq!(transit, Some(DoorTransit::Win));
        assert!(l.doors_down[0].is_open());
    }

    #[test]
    fn charging_hard_breaks_wall() {
        let mut l = layer(&[".B"]);
        let mut player = Player::new(Vec2::new(8.0, 0.0));
        player.is_charging = true;
        player.prev_vel = Vec2::new(300.0, 0.0);
        let mut events = Vec::new();
        l.collide_with_player(&mut player, &mut events);
        assert!(!l.breakable_walls[0].is_active());
        assert!(!player.is_charging);
        assert!(events.contains(&GameEvent::WallBroken {
            pos: Vec2::new(32.0, 0.0)
        }));
    }

    #[test]
    fn charging_softly_only_halts() {
        let mut l = layer(&[".B"]);
        let mut player = Player::new(Vec2::new(8.0, 0.0));
        player.is_charging = true;
        player.prev_vel = Vec2::new(100.0, 0.0);
        let mut events = Vec::new();
        l.collide_with_player(&mut player, &mut events);
        assert!(l.breakable_walls[0].is_active());
        assert!(!player.is_charging);
        assert_eq!(events, vec![GameEvent::ChargeHalted]);
    }

    #[test]
    fn walking_into_button_presses_it() {
        let mut l = layer(&["P."]);
        let mut player = Player::new(Vec2::new(0.0, 0.0));
        let mut events = Vec::new();
        l.collide_with_player(&mut player, &mut events);
        assert!(l.buttons[0].is_pressed());
        assert!(matches!(events[0], GameEvent::GravityChanged { .. }));
    }

    fn snapshot(l: &TileLayer) -> Vec<(Vec2, bool, Vec2)> {
        l.props()
            .map(|p| (p.pos(), p.body.visible, p.body.gravity))
            .collect()
    }

    proptest! {
        #[test]
        fn reset_is_idempotent(
            moves in proptest::collection::vec((0usize..4, -50.0f32..50.0, -50.0f32..50.0, any::<bool>()), 0..12),
            press in any::<bool>(),
        ) {
            let mut l = layer(&["RRKP", "*BO."]);
            let fresh = snapshot(&l);
            for (i, dx, dy, hide) in moves {
                let prop = match i {
                    0 => &mut l.rocks[0],
                    1 => &mut l.rocks[1],
                    2 => &mut l.keys[0],
                    _ => &mut l.breakable_walls[0],
                };
                prop.body.pos += Vec2::new(dx, dy);
                if hide {
                    prop.hide();
                }
            }
            if press {
                l.press_button(0, &mut Vec::new());
            }
            l.reset();
            let once = snapshot(&l);
            l.reset();
            prop_assert_eq!(&once, &snapshot(&l));
            prop_assert_eq!(&once, &fresh);
            prop_assert!(!l.buttons[0].is_pressed());
        }
    }
}
