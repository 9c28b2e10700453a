use std::path::Path;

use anyhow::Context as _;
use image::RgbaImage;

use crate::error::{SpritemillError, SpritemillResult};

/// A decoded sprite sheet, immutable once loaded.
#[derive(Clone, Debug)]
pub struct SpriteSheet {
    image: RgbaImage,
}

impl SpriteSheet {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load a sheet from disk, decoding to RGBA8.
    pub fn load(path: &Path) -> SpritemillResult<Self> {
        let dyn_img = image::open(path)
            .with_context(|| format!("decode sprite sheet '{}'", path.display()))?;
        Ok(Self {
            image: dyn_img.to_rgba8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// One cropped cell of a sprite sheet, tagged with its grid position.
#[derive(Clone, Debug)]
pub struct SpriteFrame {
    pub row: u32,
    pub col: u32,
    pub image: RgbaImage,
}

/// Partition `sheet` into a `rows x cols` grid of equal cells, row-major.
///
/// Cell dimensions are `floor(sheet.width / cols)` by `floor(sheet.height / rows)`;
/// remainder pixels at the right and bottom edges are discarded, not distributed.
/// Frame `[r][c]` covers the pixel rectangle `[c*w, r*h, (c+1)*w, (r+1)*h)` and lands
/// at sequence index `r*cols + c`.
pub fn slice_grid(
    sheet: &SpriteSheet,
    rows: u32,
    cols: u32,
) -> SpritemillResult<Vec<SpriteFrame>> {
    if rows == 0 || cols == 0 {
        return Err(SpritemillError::invalid_grid(format!(
            "grid must have at least one row and one column, got {rows}x{cols}"
        )));
    }

    let cell_w = sheet.width() / cols;
    let cell_h = sheet.height() / rows;
    if cell_w == 0 || cell_h == 0 {
        return Err(SpritemillError::invalid_grid(format!(
            "sheet {}x{} is too small for a {rows}x{cols} grid",
            sheet.width(),
            sheet.height()
        )));
    }

    let mut frames = Vec::with_capacity((rows as usize) * (cols as usize));
    for row in 0..rows {
        for col in 0..cols {
            let view =
                image::imageops::crop_imm(sheet.image(), col * cell_w, row * cell_h, cell_w, cell_h);
            frames.push(SpriteFrame {
                row,
                col,
                image: view.to_image(),
            });
        }
    }
    Ok(frames)
}
