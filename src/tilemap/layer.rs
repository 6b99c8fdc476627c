use serde::{Deserialize, Serialize};

/// Tile id that is never drawn.
pub const EMPTY_TILE: u32 = 0;

/// One cell of a layer, with its on-screen rectangle cached at the current
/// scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tile {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Tile {
    pub fn new(id: u32) -> Self {
        Self { id, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.id == EMPTY_TILE
    }
}

/// Free-form object placed on a map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Every other property, untouched.
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A named grid of tiles drawn with one tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub name: String,
    /// Name of the tileset used to draw this layer.
    pub tileset: Option<String>,
    pub visible: bool,
    /// Indexed `[row][col]`.
    pub tiles: Vec<Vec<Tile>>,
    pub entities: Vec<MapEntity>,
}

impl MapLayer {
    pub fn new(name: impl Into<String>, tileset: Option<String>, cols: usize, rows: usize) -> Self {
        let mut layer = Self {
            name: name.into(),
            tileset,
            visible: true,
            tiles: Vec::new(),
            entities: Vec::new(),
        };
        layer.set_size(cols, rows);
        layer
    }

    /// Resize to `rows` x `cols`, keeping existing tiles and filling new
    /// cells with the empty tile.
    pub fn set_size(&mut self, cols: usize, rows: usize) {
        self.tiles.resize_with(rows, Vec::new);
        for row in &mut self.tiles {
            row.resize(cols, Tile::new(EMPTY_TILE));
        }
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.tiles.get(row).and_then(|r| r.get(col))
    }

    /// Returns false when the cell is outside the layer.
    pub fn set_tile(&mut self, row: usize, col: usize, id: u32) -> bool {
        match self.tiles.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(tile) => {
                tile.id = id;
                true
            }
            None => false,
        }
    }
}
