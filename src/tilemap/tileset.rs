/// Grid of square tiles cut from one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    pub name: String,
    /// Size of one tile on the tileset image, in pixels.
    pub tile_size: u32,
    /// Known once the image is loaded.
    rows: Option<u32>,
    cols: Option<u32>,
}

impl Tileset {
    pub fn new(name: impl Into<String>, tile_size: u32) -> Self {
        Self { name: name.into(), tile_size, rows: None, cols: None }
    }

    /// Resource key of the tileset image.
    pub fn image_key(&self) -> String {
        format!("tileset-{}", self.name)
    }

    pub fn on_image_loaded(&mut self, image_width: u32, image_height: u32) {
        let size = self.tile_size.max(1);
        self.rows = Some(image_height / size);
        self.cols = Some(image_width / size);
    }

    pub fn is_image_loaded(&self) -> bool {
        self.cols.is_some()
    }

    pub fn rows(&self) -> Option<u32> { self.rows }
    pub fn cols(&self) -> Option<u32> { self.cols }

    /// Top-left pixel of tile `index` on the tileset image. `None` until the
    /// image is loaded or when the image is narrower than one tile.
    pub fn index_to_position(&self, index: u32) -> Option<(u32, u32)> {
        let cols = self.cols.filter(|c| *c > 0)?;
        Some(((index % cols) * self.tile_size, (index / cols) * self.tile_size))
    }
}
