//! The ring of four quadrants and cross-quadrant level changes

use super::event::GameEvent;
use super::quadrant::{Direction, FadeAction, MapQuadrant, QuadrantId, Topology};
use super::tilemap::TileMap;

#[derive(Debug, Clone)]
pub struct QuadrantRing {
    quadrants: [MapQuadrant; 4],
    current: QuadrantId,
}

impl QuadrantRing {
    /// Build the ring from maps in `QuadrantId::ALL` order. Top-left starts
    /// lit and current.
    pub fn new(maps: [TileMap; 4], topology: &Topology) -> Self {
        let [top_left, top_right, bottom_right, bottom_left] = maps;
        let build = |id: QuadrantId, map: TileMap| {
            MapQuadrant::new(id, map, topology.flags(id), id == QuadrantId::TopLeft)
        };
        let quadrants = [
            build(QuadrantId::TopLeft, top_left),
            build(QuadrantId::TopRight, top_right),
            build(QuadrantId::BottomRight, bottom_right),
            build(QuadrantId::BottomLeft, bottom_left),
        ];
        Self {
            quadrants,
            current: QuadrantId::TopLeft,
        }
    }

    #[inline]
    pub fn current_id(&self) -> QuadrantId {
        self.current
    }

    pub fn current(&self) -> &MapQuadrant {
        self.get(self.current)
    }

    pub fn get(&self, id: QuadrantId) -> &MapQuadrant {
        &self.quadrants[id.index()]
    }

    pub fn get_mut(&mut self, id: QuadrantId) -> &mut MapQuadrant {
        &mut self.quadrants[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapQuadrant> {
        self.quadrants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MapQuadrant> {
        self.quadrants.iter_mut()
    }

    pub fn any_fading(&self) -> bool {
        self.quadrants.iter().any(MapQuadrant::is_fading)
    }

    /// `(quadrant, layer)` of the current layer of every visible quadrant
    pub fn active_layers(&self) -> Vec<(QuadrantId, usize)> {
        self.quadrants
            .iter()
            .filter(|q| q.is_visible())
            .map(|q| (q.id, q.current_layer_index()))
            .collect()
    }

    /// Fade out every visible quadrant with a completion action
    pub fn fade_out_visible(&mut self, on_complete: FadeAction) {
        for q in self.quadrants.iter_mut().filter(|q| q.is_visible()) {
            q.fade_out(None, Some(on_complete));
        }
    }

    /// A door in `from` was used: shift the linked quadrant, fade the
    /// neighbours, and move the current pointer
    ///
    /// Returns the new current quadrant, or `None` if the guard rejected it.
    pub fn trigger_level_change(
        &mut self,
        from: QuadrantId,
        direction: Direction,
        events: &mut Vec<GameEvent>,
    ) -> Option<QuadrantId> {
        let quadrant = self.get_mut(from);
        let propagate = quadrant.begin_level_change(direction)?;
        let relations = quadrant.relations;
        log::info!("{} level change {:?}", from.name(), direction);

        if propagate {
            let linked = self.get_mut(relations.linked);
            if let Some(layer) = linked.adjust_layer(direction) {
                events.push(GameEvent::LayerSwitched {
                    quadrant: relations.linked,
                    layer,
                });
            }
        }

        let close = Some(direction.door_kind());
        let new_current = match direction {
            Direction::Up => {
                self.get_mut(relations.next).fade_in(close, None);
                self.get_mut(relations.prev).fade_out(close, None);
                relations.next
            }
            Direction::Down => {
                self.get_mut(relations.next).fade_out(close, None);
                self.get_mut(relations.prev).fade_in(close, None);
                relations.prev
            }
        };
        self.current = new_current;
        log::info!("Current quadrant is now {}", new_current.name());
        events.push(GameEvent::CurrentQuadrantChanged {
            quadrant: new_current,
        });
        Some(new_current)
    }
}
