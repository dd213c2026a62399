//! Tile grids and map loading
//!
//! Each quadrant ships as one Tiled JSON map covering the whole 22x22 world,
//! with its content drawn in its own quarter. A map holds up to three tile
//! layers named `Tile Layer 1..3`; each becomes one selectable layer of the
//! quadrant. Tile values are role codes (see `crate::consts::TILE_*`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::body::Aabb;
use crate::consts::*;

/// Layer names, in stacking order
pub const LAYER_NAMES: [&str; 3] = ["Tile Layer 1", "Tile Layer 2", "Tile Layer 3"];

#[derive(Debug, Error)]
pub enum MapError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layer '{layer}' has {actual} tiles, expected {expected}")]
    SizeMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },

    #[error("Map '{map}' has {count} tile layers, expected 2 or 3")]
    LayerCount { map: String, count: usize },

    #[error("Unknown tile glyph '{0}'")]
    UnknownGlyph(char),

    #[error("Ragged grid: row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// A rectangular grid of tile codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<u32>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, tiles: Vec<u32>) -> Result<Self, MapError> {
        if tiles.len() != width * height {
            return Err(MapError::SizeMismatch {
                layer: String::from("<grid>"),
                expected: width * height,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Build a grid from text rows, one glyph per tile
    ///
    /// `.` empty, `#` wall, `~` water, `U` door up, `D` door down,
    /// `B` breakable wall, `O` hole, `R` rock, `F` final door, `*` diamond,
    /// `K` key, `P` button.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut tiles = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let count = line.chars().count();
            if count != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    actual: count,
                });
            }
            for glyph in line.chars() {
                tiles.push(glyph_code(glyph)?);
            }
        }
        Self::new(width, height, tiles)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile code at (x, y); out of bounds reads as empty
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x]
        } else {
            TILE_EMPTY
        }
    }

    /// Cells holding `code`, in row-major order
    pub fn positions_of(&self, code: u32) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, t)| **t == code)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Boxes of solid wall cells that overlap `area`
    pub fn solid_boxes(&self, area: &Aabb) -> Vec<Aabb> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let x0 = (area.min.x / TILE_SIZE).floor().max(0.0) as usize;
        let y0 = (area.min.y / TILE_SIZE).floor().max(0.0) as usize;
        let x1 = ((area.max.x / TILE_SIZE).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((area.max.y / TILE_SIZE).ceil().max(0.0) as usize).min(self.height);

        let mut boxes = Vec::new();
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) == TILE_WALL {
                    let cell = Aabb::tile(x, y);
                    if cell.intersects(area) {
                        boxes.push(cell);
                    }
                }
            }
        }
        boxes
    }
}

fn glyph_code(glyph: char) -> Result<u32, MapError> {
    Ok(match glyph {
        '.' | ' ' => TILE_EMPTY,
        '#' => TILE_WALL,
        '~' => TILE_WATER,
        'U' => TILE_DOOR_UP,
        'D' => TILE_DOOR_DOWN,
        'B' => TILE_BREAKABLE_WALL,
        'O' => TILE_HOLE,
        'R' => TILE_ROCK,
        'F' => TILE_FINAL_DOOR,
        '*' => TILE_DIAMOND,
        'K' => TILE_KEY,
        'P' => TILE_BUTTON,
        other => return Err(MapError::UnknownGlyph(other)),
    })
}

/// One quadrant's map: its name and the tile grids of its layers
#[derive(Debug, Clone)]
pub struct TileMap {
    pub name: String,
    pub layers: Vec<(String, TileGrid)>,
}

impl TileMap {
    /// Build a map from grids, naming layers in stacking order
    pub fn from_grids(name: &str, grids: Vec<TileGrid>) -> Result<Self, MapError> {
        let layers: Vec<_> = LAYER_NAMES
            .iter()
            .map(|n| n.to_string())
            .zip(grids)
            .collect();
        let map = Self {
            name: name.to_string(),
            layers,
        };
        map.validate()?;
        Ok(map)
    }

    /// Parse a Tiled JSON map
    pub fn from_tiled_json(name: &str, json: &str) -> Result<Self, MapError> {
        let raw: TiledMap = serde_json::from_str(json)?;
        let mut layers = Vec::new();
        for layer_name in LAYER_NAMES {
            let Some(layer) = raw
                .layers
                .iter()
                .find(|l| l.kind == "tilelayer" && l.name == layer_name)
            else {
                continue;
            };
            let width = layer.width.unwrap_or(raw.width);
            let height = layer.height.unwrap_or(raw.height);
            let grid = TileGrid::new(width, height, layer.data.clone()).map_err(|_| {
                MapError::SizeMismatch {
                    layer: layer_name.to_string(),
                    expected: width * height,
                    actual: layer.data.len(),
                }
            })?;
            layers.push((layer_name.to_string(), grid));
        }
        let map = Self {
            name: name.to_string(),
            layers,
        };
        map.validate()?;
        log::debug!("Parsed map '{}' with {} layers", name, map.layers.len());
        Ok(map)
    }

    /// Read and parse a Tiled JSON map file
    pub fn load(name: &str, path: &Path) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_tiled_json(name, &text)
    }

    /// A playable map has two or three tile layers
    pub fn validate(&self) -> Result<(), MapError> {
        let count = self.layers.len();
        if !(2..=LAYER_NAMES.len()).contains(&count) {
            return Err(MapError::LayerCount {
                map: self.name.clone(),
                count,
            });
        }
        Ok(())
    }
}

/// Subset of the Tiled JSON format the game reads
#[derive(Debug, Deserialize)]
struct TiledMap {
    width: usize,
    height: usize,
    #[serde(default)]
    layers: Vec<TiledLayer>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Vec<u32>,
    width: Option<usize>,
    height: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn ascii_glyphs_map_to_codes() {
        let grid = TileGrid::from_ascii(&["#~UD", "BORF", "*KP."]).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(0, 0), TILE_WALL);
        assert_eq!(grid.get(3, 1), TILE_FINAL_DOOR);
        assert_eq!(grid.get(2, 2), TILE_BUTTON);
        assert_eq!(grid.get(9, 9), TILE_EMPTY);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TileGrid::from_ascii(&["###", "##"]).unwrap_err();
        assert!(matches!(err, MapError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn unknown_glyph_is_rejected() {
        assert!(matches!(
            TileGrid::from_ascii(&["#?"]),
            Err(MapError::UnknownGlyph('?'))
        ));
    }

    #[test]
    fn positions_are_row_major() {
        let grid = TileGrid::from_ascii(&[".R.", "R.R"]).unwrap();
        let found: Vec<_> = grid.positions_of(TILE_ROCK).collect();
        assert_eq!(found, vec![(1, 0), (0, 1), (2, 1)]);
    }

    #[test]
    fn solid_boxes_only_cover_overlapped_walls() {
        let grid = TileGrid::from_ascii(&["###", "#..", "#.."]).unwrap();
        let area = Aabb::new(Vec2::new(40.0, 40.0), Vec2::splat(10.0));
        assert!(grid.solid_boxes(&area).is_empty());

        let area = Aabb::new(Vec2::new(20.0, 40.0), Vec2::splat(20.0));
        let boxes = grid.solid_boxes(&area);
        assert_eq!(boxes, vec![Aabb::tile(0, 1)]);
    }

    #[test]
    fn tiled_json_layers_load_in_order() {
        let json = r#"{
            "width": 2, "height": 2,
            "layers": [
                {"name": "Tile Layer 2", "type": "tilelayer", "data": [0, 7, 0, 0]},
                {"name": "Objects", "type": "objectgroup"},
                {"name": "Tile Layer 1", "type": "tilelayer", "data": [1, 1, 1, 1], "width": 2, "height": 2}
            ]
        }"#;
        let map = TileMap::from_tiled_json("top-left", json).unwrap();
        assert_eq!(map.layers.len(), 2);
        assert_eq!(map.layers[0].0, "Tile Layer 1");
        assert_eq!(map.layers[0].1.get(1, 1), TILE_WALL);
        assert_eq!(map.layers[1].1.get(1, 0), TILE_ROCK);
    }

    #[test]
    fn tiled_json_size_mismatch_names_layer() {
        let json = r#"{
            "width": 2, "height": 2,
            "layers": [
                {"name": "Tile Layer 1", "type": "tilelayer", "data": [1, 1, 1]},
                {"name": "Tile Layer 2", "type": "tilelayer", "data": [0, 0, 0, 0]}
            ]
        }"#;
        match TileMap::from_tiled_json("m", json) {
            Err(MapError::SizeMismatch { layer, actual, .. }) => {
                assert_eq!(layer, "Tile Layer 1");
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn single_layer_map_is_rejected() {
        let grid = TileGrid::from_ascii(&["."]).unwrap();
        assert!(matches!(
            TileMap::from_grids("lonely", vec![grid]),
            Err(MapError::LayerCount { count: 1, .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TileMap::load("x", Path::new("/nonexistent/clockwise/map.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/clockwise/map.json"));
    }

    #[test]
    fn bundled_world_loads() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/map");
        for name in ["top-left", "top-right", "bottom-right", "bottom-left"] {
            let map = TileMap::load(name, &dir.join(format!("{name}.json"))).unwrap();
            assert_eq!(map.layers.len(), 2);
            assert_eq!(map.layers[0].1.width(), NUM_TILES);
        }
    }
}
