//! Collision detection and response for axis-aligned bodies
//!
//! Arcade-style separation: overlapping boxes are pushed apart along the axis
//! of least penetration, and velocities on that axis are exchanged (movable
//! pairs) or reflected with bounce (against immovable bodies and tiles).

use glam::Vec2;

use super::body::{Aabb, Body};
use super::tilemap::TileGrid;

/// Anything that carries a physics body
pub trait HasBody {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
}

impl HasBody for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}

/// Result of a box overlap check
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit axis pointing from `b` toward `a`
    pub normal: Vec2,
    /// Penetration depth along `normal`
    pub penetration: f32,
}

/// Minimum-translation contact between two boxes, if they overlap
pub fn aabb_contact(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if !a.intersects(b) {
        return None;
    }
    let pen_x = (a.max.x - b.min.x).min(b.max.x - a.min.x);
    let pen_y = (a.max.y - b.min.y).min(b.max.y - a.min.y);
    let delta = a.center() - b.center();

    let contact = if pen_x < pen_y {
        Contact {
            normal: Vec2::new(if delta.x < 0.0 { -1.0 } else { 1.0 }, 0.0),
            penetration: pen_x,
        }
    } else {
        Contact {
            normal: Vec2::new(0.0, if delta.y < 0.0 { -1.0 } else { 1.0 }),
            penetration: pen_y,
        }
    };
    Some(contact)
}

/// Do two enabled bodies overlap? (detect only, no response)
#[inline]
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.enabled && b.enabled && a.bounds().intersects(&b.bounds())
}

/// Push `body` out of a static box. Returns true on contact.
pub fn separate_static(body: &mut Body, wall: &Aabb) -> bool {
    if !body.enabled || body.immovable {
        return false;
    }
    let Some(contact) = aabb_contact(&body.bounds(), wall) else {
        return false;
    };
    body.pos += contact.normal * contact.penetration;
    reflect_into(body, contact.normal, 0.0);
    true
}

/// Separate two bodies. Returns true if they were in contact.
///
/// Two immovable bodies never separate, matching arcade semantics.
pub fn separate(a: &mut Body, b: &mut Body) -> bool {
    if !a.enabled || !b.enabled || (a.immovable && b.immovable) {
        return false;
    }
    let Some(contact) = aabb_contact(&a.bounds(), &b.bounds()) else {
        return false;
    };
    let n = contact.normal;
    let push = n * contact.penetration;

    if b.immovable {
        a.pos += push;
        let other = b.vel.dot(n);
        reflect_into(a, n, other);
    } else if a.immovable {
        b.pos -= push;
        let other = a.vel.dot(-n);
        reflect_into(b, -n, other);
    } else {
        a.pos += push * 0.5;
        b.pos -= push * 0.5;

        // Equal-mass exchange along the contact axis
        let v1 = a.vel.dot(n);
        let v2 = b.vel.dot(n);
        if v1 - v2 < 0.0 {
            let avg = (v1 + v2) * 0.5;
            let bounce_a = a.bounce.dot(n.abs());
            let bounce_b = b.bounce.dot(n.abs());
            let new_a = avg + (v2 - avg) * bounce_a;
            let new_b = avg + (v1 - avg) * bounce_b;
            a.vel += n * (new_a - v1);
            b.vel += n * (new_b - v2);
        }
    }
    true
}

/// Reflect the velocity component along `n` if it points into the obstacle
fn reflect_into(body: &mut Body, n: Vec2, obstacle_vel: f32) {
    let v = body.vel.dot(n);
    if v - obstacle_vel < 0.0 {
        let bounce = body.bounce.dot(n.abs());
        let new_v = obstacle_vel - (v - obstacle_vel) * bounce;
        body.vel += n * (new_v - v);
    }
}

/// Collide a body with the solid cells of a tile grid
pub fn collide_with_grid(body: &mut Body, grid: &TileGrid) -> bool {
    if !body.enabled {
        return false;
    }
    let mut hit = false;
    for cell in grid.solid_boxes(&body.bounds()) {
        hit |= separate_static(body, &cell);
    }
    hit
}

/// Collide a body with a set of static boxes
pub fn collide_with_boxes(body: &mut Body, boxes: &[Aabb]) -> bool {
    let mut hit = false;
    for wall in boxes {
        hit |= separate_static(body, wall);
    }
    hit
}

/// Collide every member of a group with a tile grid
pub fn collide_group_with_grid<T: HasBody>(group: &mut [T], grid: &TileGrid) {
    for item in group.iter_mut() {
        collide_with_grid(item.body_mut(), grid);
    }
}

/// Collide every member of a group with a set of static boxes
pub fn collide_group_with_boxes<T: HasBody>(group: &mut [T], boxes: &[Aabb]) {
    for item in group.iter_mut() {
        collide_with_boxes(item.body_mut(), boxes);
    }
}

/// Collide every member of `a` with every member of `b`
pub fn collide_groups<A: HasBody, B: HasBody>(a: &mut [A], b: &mut [B]) {
    for x in a.iter_mut() {
        for y in b.iter_mut() {
            separate(x.body_mut(), y.body_mut());
        }
    }
}

/// Collide each distinct pair within one group
pub fn collide_group_with_itself<T: HasBody>(group: &mut [T]) {
    for i in 0..group.len() {
        let (head, tail) = group.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            separate(a.body_mut(), b.body_mut());
        }
    }
}

/// Indices of group members a body collides with, resolving each contact
///
/// `process` filters candidates before resolution (e.g. only closed doors).
pub fn collide_body_with_group<T: HasBody>(
    body: &mut Body,
    group: &mut [T],
    process: impl Fn(&T) -> bool,
) -> Vec<usize> {
    let mut hits = Vec::new();
    for (i, item) in group.iter_mut().enumerate() {
        if !process(item) {
            continue;
        }
        if separate(body, item.body_mut()) {
            hits.push(i);
        }
    }
    hits
}

/// Indices of group members overlapping a body (no response)
pub fn overlap_body_with_group<T: HasBody>(body: &Body, group: &[T]) -> Vec<usize> {
    group
        .iter()
        .enumerate()
        .filter(|(_, item)| overlaps(body, item.body()))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TILE_WALL;

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y))
    }

    #[test]
    fn contact_picks_axis_of_least_penetration() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::splat(32.0));
        let b = Aabb::new(Vec2::new(30.0, 4.0), Vec2::splat(32.0));
        let c = aabb_contact(&a, &b).unwrap();
        assert_eq!(c.normal, Vec2::new(-1.0, 0.0));
        assert!((c.penetration - 2.0).abs() < 1e-5);
    }

    #[test]
    fn static_separation_reflects_with_bounce() {
        let mut body = body_at(0.0, 0.0);
        body.vel = Vec2::new(100.0, 0.0);
        body.bounce = Vec2::splat(0.2);
        let wall = Aabb::new(Vec2::new(30.0, 0.0), Vec2::splat(32.0));
        assert!(separate_static(&mut body, &wall));
        assert!((body.pos.x + 2.0).abs() < 1e-5);
        assert!((body.vel.x + 20.0).abs() < 1e-4);
    }

    #[test]
    fn moving_away_keeps_velocity() {
        let mut body = body_at(0.0, 0.0);
        body.vel = Vec2::new(-50.0, 0.0);
        let wall = Aabb::new(Vec2::new(30.0, 0.0), Vec2::splat(32.0));
        separate_static(&mut body, &wall);
        assert_eq!(body.vel.x, -50.0);
    }

    #[test]
    fn immovable_pair_does_not_separate() {
        let mut a = body_at(0.0, 0.0).immovable();
        let mut b = body_at(10.0, 0.0).immovable();
        assert!(!separate(&mut a, &mut b));
        assert_eq!(b.pos.x, 10.0);
    }

    #[test]
    fn pushing_a_movable_body_shares_velocity() {
        let mut pusher = body_at(0.0, 0.0);
        pusher.vel = Vec2::new(100.0, 0.0);
        let mut rock = body_at(30.0, 0.0);
        assert!(separate(&mut pusher, &mut rock));
        assert!((pusher.vel.x - 50.0).abs() < 1e-4);
        assert!((rock.vel.x - 50.0).abs() < 1e-4);
        assert!(rock.pos.x > 30.0);
        assert!(pusher.pos.x < 0.0);
    }

    #[test]
    fn disabled_bodies_are_ignored() {
        let mut a = body_at(0.0, 0.0);
        let mut b = body_at(10.0, 0.0);
        b.hide();
        assert!(!separate(&mut a, &mut b));
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn grid_collision_blocks_walls() {
        let grid = TileGrid::from_ascii(&["..#"]).unwrap();
        assert_eq!(grid.get(2, 0), TILE_WALL);
        let mut body = body_at(40.0, 0.0);
        body.vel = Vec2::new(200.0, 0.0);
        assert!(collide_with_grid(&mut body, &grid));
        assert!(body.bounds().max.x <= 64.0 + 1e-4);
        assert!(body.vel.x <= 0.0);
    }

    #[test]
    fn group_self_collision_touches_each_pair() {
        let mut group = vec![body_at(0.0, 0.0), body_at(20.0, 0.0), body_at(200.0, 0.0)];
        collide_group_with_itself(&mut group);
        assert!(!group[0].bounds().intersects(&group[1].bounds()));
        assert_eq!(group[2].pos.x, 200.0);
    }

    #[test]
    fn process_filter_skips_candidates() {
        let mut player = body_at(0.0, 0.0);
        let mut doors = vec![body_at(20.0, 0.0).immovable(), body_at(0.0, 20.0).immovable()];
        let hits = collide_body_with_group(&mut player, &mut doors, |d| d.pos.y > 0.0);
        assert_eq!(hits, vec![1]);
    }
}
