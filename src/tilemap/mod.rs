mod layer;
mod tileset;

pub use layer::{EMPTY_TILE, MapEntity, MapLayer, Tile};
pub use tileset::Tileset;

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::camera::Camera;
use crate::canvas::{Canvas, Color, Image};
use crate::error::TilemapError;
use crate::resources::{LoadEvent, LoadSummary, ResourceManager, ResourceRequest};
use crate::viewport::Viewport;

pub const DEFAULT_TILE_SIZE: u32 = 32;

const GRID_COLOR: Color = Color::rgba(0, 0, 0, 51);

/// Round half up; keeps adjacent tiles from leaving seams when scaled.
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Prefix `url` with `root` unless it is already absolute (http(s) or an
/// absolute path).
pub fn resolve_asset_url(root: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || Path::new(url).is_absolute() {
        url.to_string()
    } else {
        format!("{root}{url}")
    }
}

/// Range of cells currently on screen, end exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleRect {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

type LayerCallback = Box<dyn FnMut(usize, &mut Canvas)>;

/// Layered tile map loaded from JSON.
pub struct TileMap {
    pub name: String,
    pub tile_size: u32,
    cols: usize,
    rows: usize,
    pub image_root: String,
    pub custom_attributes: serde_json::Map<String, serde_json::Value>,
    pub layers: Vec<MapLayer>,
    pub tilesets: Vec<Tileset>,
    /// `(resource key, url)` of every image the map needs.
    images: Vec<(String, String)>,
    pub display_grid: bool,
    /// Size of the area the map is shown in; the game size when `None`.
    pub view: Option<(f32, f32)>,
    visible: VisibleRect,
    camera_position: Vec2,
    camera_scaling: f32,
    render_scaling: Vec2,
    recalculate: bool,
    layer_callbacks: Vec<LayerCallback>,
}

impl TileMap {
    /// Empty map of the given size with no layers.
    pub fn new(name: impl Into<String>, cols: usize, rows: usize, tile_size: u32) -> Self {
        Self {
            name: name.into(),
            tile_size: tile_size.max(1),
            cols,
            rows,
            image_root: String::new(),
            custom_attributes: serde_json::Map::new(),
            layers: Vec::new(),
            tilesets: Vec::new(),
            images: Vec::new(),
            display_grid: false,
            view: None,
            visible: VisibleRect::default(),
            camera_position: Vec2::ZERO,
            camera_scaling: 1.0,
            render_scaling: Vec2::ONE,
            recalculate: true,
            layer_callbacks: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TilemapError> {
        let raw: RawMap = serde_json::from_str(json)?;
        let mut map = Self::new(raw.name, raw.cols, raw.rows, raw.tile_size);
        map.image_root = raw.assets.image_root;
        map.custom_attributes = raw.custom_attributes;

        for (key, url) in raw.assets.images {
            let url = resolve_asset_url(&map.image_root, &url);
            map.images.push((key, url));
        }
        for (name, tileset) in raw.assets.tilesets {
            let ts = Tileset::new(name, tileset.tile_size);
            let url = resolve_asset_url(&map.image_root, &tileset.url);
            map.images.push((ts.image_key(), url));
            map.tilesets.push(ts);
        }

        for raw_layer in raw.layers {
            let tileset = match raw_layer.tileset {
                Some(name) if map.tileset_by_name(&name).is_none() => {
                    return Err(TilemapError::UnknownTileset { map: map.name.clone(), tileset: name });
                }
                Some(name) => Some(name),
                None => map.tilesets.first().map(|t| t.name.clone()),
            };

            let mut layer = MapLayer {
                name: raw_layer.name,
                tileset,
                visible: raw_layer.visible,
                tiles: raw_layer
                    .tiles
                    .into_iter()
                    .map(|row| row.into_iter().map(Tile::new).collect())
                    .collect(),
                entities: raw_layer.entities,
            };
            if !layer.tiles.is_empty() && layer.tiles.len() != map.rows {
                return Err(TilemapError::LayerSize {
                    layer: layer.name,
                    expected: map.rows,
                    found: layer.tiles.len(),
                });
            }
            layer.set_size(map.cols, map.rows);
            map.layers.push(layer);
        }

        debug!(map = %map.name, layers = map.layers.len(), tilesets = map.tilesets.len(), "tilemap_parsed");
        Ok(map)
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }

    /// Map width in pixels.
    pub fn width(&self) -> u32 { self.cols as u32 * self.tile_size }
    /// Map height in pixels.
    pub fn height(&self) -> u32 { self.rows as u32 * self.tile_size }

    pub fn visible_rect(&self) -> VisibleRect { self.visible }

    /// Images the map needs, as `(resource key, url)`.
    pub fn images(&self) -> &[(String, String)] { &self.images }

    /// Resize every layer, padding with empty tiles.
    pub fn set_size(&mut self, cols: usize, rows: usize) {
        for layer in &mut self.layers {
            layer.set_size(cols, rows);
        }
        self.cols = cols;
        self.rows = rows;
        self.recalculate = true;
    }

    /// Append a layer, resized to the map.
    pub fn add_layer(&mut self, mut layer: MapLayer) {
        layer.set_size(self.cols, self.rows);
        self.layers.push(layer);
        self.recalculate = true;
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_by_name_mut(&mut self, name: &str) -> Option<&mut MapLayer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn tileset_by_name(&self, name: &str) -> Option<&Tileset> {
        self.tilesets.iter().find(|t| t.name == name)
    }

    pub fn entities_by_type(&self, kind: &str) -> Vec<&MapEntity> {
        self.layers
            .iter()
            .flat_map(|l| l.entities.iter())
            .filter(|e| e.kind == kind)
            .collect()
    }

    /// Register a callback run right after each layer is drawn, with the
    /// layer index and a canvas scaled to map pixels.
    pub fn on_layer_rendered(&mut self, callback: impl FnMut(usize, &mut Canvas) + 'static) {
        self.layer_callbacks.push(Box::new(callback));
    }

    // ── Scaling ──────────────────────────────────────────────────────────────

    pub fn scaling(&self) -> Vec2 {
        self.render_scaling * self.camera_scaling
    }

    fn apply_scaling_x(&self, value: f32) -> f32 {
        round_half_up(self.scaling().x * value)
    }

    fn apply_scaling_y(&self, value: f32) -> f32 {
        round_half_up(self.scaling().y * value)
    }

    /// Recompute the visible cells and, when any scaling changed, the
    /// on-screen rectangle of every tile. Call once per tick.
    pub fn update(&mut self, camera: Option<&Camera>, viewport: &Viewport, game_width: f32, game_height: f32) {
        let (position, scaling, camera_changed) = camera
            .map_or((Vec2::ZERO, 1.0, false), |c| (c.position, c.scaling, c.has_scaling_changed()));
        let render_scaling = viewport.render_scaling();

        if camera_changed
            || viewport.has_scaling_changed
            || scaling != self.camera_scaling
            || render_scaling != self.render_scaling
        {
            self.recalculate = true;
        }
        self.camera_position = position;
        self.camera_scaling = scaling;
        self.render_scaling = render_scaling;

        let (view_w, view_h) = self.view.unwrap_or((game_width, game_height));
        let ts = self.tile_size as f32;
        let start_row = (position.y / scaling / ts).floor().max(0.0) as usize;
        let start_col = (position.x / scaling / ts).floor().max(0.0) as usize;
        self.visible = VisibleRect {
            start_row,
            start_col,
            end_row: ((start_row as f32 + 1.0 + view_h / (ts * scaling)).ceil() as usize).min(self.rows),
            end_col: ((start_col as f32 + 1.0 + view_w / (ts * scaling)).ceil() as usize).min(self.cols),
        };

        if self.recalculate {
            let sx = self.scaling().x;
            let sy = self.scaling().y;
            for layer in &mut self.layers {
                for (row, tiles) in layer.tiles.iter_mut().enumerate() {
                    for (col, tile) in tiles.iter_mut().enumerate() {
                        tile.x = round_half_up(sx * (col as f32 * ts));
                        tile.y = round_half_up(sy * (row as f32 * ts));
                        tile.w = round_half_up(sx * ((col + 1) as f32 * ts)) - tile.x;
                        tile.h = round_half_up(sy * ((row + 1) as f32 * ts)) - tile.y;
                    }
                }
            }
            self.recalculate = false;
        }
    }

    pub fn for_each_visible_tile(&self, mut f: impl FnMut(usize, usize)) {
        let v = self.visible;
        for row in v.start_row..v.end_row {
            for col in v.start_col..v.end_col {
                f(row, col);
            }
        }
    }

    // ── Coordinates ──────────────────────────────────────────────────────────

    /// Convert a canvas pixel position into map pixels, undoing viewport
    /// scaling and the camera.
    pub fn canvas_pos_to_map_pos(&self, canvas_x: f32, canvas_y: f32) -> Vec2 {
        let game = Vec2::new(canvas_x, canvas_y) / self.render_scaling;
        (game + self.camera_position) / self.camera_scaling
    }

    /// Cell containing a map-pixel position, clamped to the map.
    pub fn pos_to_cell(&self, pos: Vec2) -> Cell {
        let ts = self.tile_size as f32;
        let clamp = |v: f32, len: usize| (v / ts).floor().max(0.0).min(len.saturating_sub(1) as f32) as usize;
        Cell { row: clamp(pos.y, self.rows), col: clamp(pos.x, self.cols) }
    }

    pub fn canvas_pos_to_cell(&self, canvas_x: f32, canvas_y: f32) -> Cell {
        self.pos_to_cell(self.canvas_pos_to_map_pos(canvas_x, canvas_y))
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    /// Draw every visible layer. Expects the viewport scaling to be applied
    /// to `canvas`, as it is during a state render.
    pub fn render(&mut self, canvas: &mut Canvas, resources: &ResourceManager) {
        let rs = self.render_scaling;
        let scaling = self.scaling();

        canvas.save();
        canvas.scale(1.0 / rs.x, 1.0 / rs.y);
        // Must happen after the viewport scaling is removed.
        canvas.translate(
            round_half_up(-self.camera_position.x * rs.x),
            round_half_up(-self.camera_position.y * rs.y),
        );

        for index in 0..self.layers.len() {
            let layer = &self.layers[index];
            let tileset = layer.tileset.as_deref().and_then(|name| self.tileset_by_name(name));
            let image = tileset.and_then(|t| resources.get_image(&t.image_key()));
            if let (Some(tileset), Some(image)) = (tileset, image) {
                render_layer(canvas, layer, tileset, image, self.visible);
            }

            if !self.layer_callbacks.is_empty() {
                canvas.save();
                canvas.scale(scaling.x, scaling.y);
                for callback in &mut self.layer_callbacks {
                    callback(index, canvas);
                }
                canvas.restore();
            }
        }

        if self.display_grid {
            self.draw_grid(canvas);
        }
        canvas.restore();
    }

    /// Outline every visible cell. Used by [`render`](Self::render) when
    /// `display_grid` is set.
    pub fn draw_grid(&self, canvas: &mut Canvas) {
        let ts = self.tile_size as f32;
        self.for_each_visible_tile(|row, col| {
            canvas.stroke_rect(
                self.apply_scaling_x(col as f32 * ts),
                self.apply_scaling_y(row as f32 * ts),
                self.apply_scaling_x(ts),
                self.apply_scaling_y(ts),
                1.0,
                GRID_COLOR,
            );
        });
    }

    // ── Assets ───────────────────────────────────────────────────────────────

    pub fn queue_assets(&self, resources: &mut ResourceManager) {
        for (key, url) in &self.images {
            resources.add_to_queue(ResourceRequest::image(key.clone(), url.clone()));
        }
    }

    /// Read tileset dimensions from the loaded images.
    pub fn on_assets_loaded(&mut self, resources: &ResourceManager) {
        for tileset in &mut self.tilesets {
            match resources.get_image(&tileset.image_key()) {
                Some(image) => tileset.on_image_loaded(image.width(), image.height()),
                None => warn!(map = %self.name, tileset = %tileset.name, "tileset_image_missing"),
            }
        }
    }

    /// Queue, load and register every map image in one go.
    pub fn load_assets(&mut self, resources: &mut ResourceManager, on_event: impl FnMut(&LoadEvent)) -> LoadSummary {
        self.queue_assets(resources);
        let summary = resources.load_queue(on_event);
        self.on_assets_loaded(resources);
        summary
    }
}

fn render_layer(canvas: &mut Canvas, layer: &MapLayer, tileset: &Tileset, image: &Image, visible: VisibleRect) {
    if !layer.visible || !tileset.is_image_loaded() {
        return;
    }
    let size = tileset.tile_size as f32;
    for row in visible.start_row..visible.end_row {
        for col in visible.start_col..visible.end_col {
            let Some(tile) = layer.tile(row, col).filter(|t| !t.is_empty()) else {
                continue;
            };
            if let Some((sx, sy)) = tileset.index_to_position(tile.id) {
                canvas.draw_image_region(image, [sx as f32, sy as f32, size, size], [tile.x, tile.y, tile.w, tile.h]);
            }
        }
    }
}

// ── Raw (JSON-facing) types ───────────────────────────────────────────────────

fn default_tile_size() -> u32 { DEFAULT_TILE_SIZE }
fn default_layer_name() -> String { "new-layer".to_string() }
fn default_visible() -> bool { true }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMap {
    #[serde(default)]
    name: String,
    cols: usize,
    rows: usize,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
    #[serde(default)]
    custom_attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    assets: RawAssets,
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawAssets {
    image_root: String,
    images: BTreeMap<String, String>,
    tilesets: BTreeMap<String, RawTileset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTileset {
    url: String,
    #[serde(default = "default_tile_size")]
    tile_size: u32,
}

#[derive(Deserialize)]
struct RawLayer {
    #[serde(default = "default_layer_name")]
    name: String,
    #[serde(default)]
    tileset: Option<String>,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    tiles: Vec<Vec<u32>>,
    #[serde(default)]
    entities: Vec<MapEntity>,
}
