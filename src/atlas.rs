//! Shared texture atlas: grid layout and pixel composition
//!
//! Every texture gets a cell of the same size (the largest width by the
//! largest height). Cells fill rows left to right; a row holds as many cells
//! as fit in the configured maximum width.

use crate::error::{Error, Result};
use crate::texture::TextureImage;
use image::{Rgba, RgbaImage};

pub const DEFAULT_MAX_ROW_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasConfig {
	pub max_row_width: u32,
}

impl Default for AtlasConfig {
	fn default() -> Self {
		AtlasConfig {
			max_row_width: DEFAULT_MAX_ROW_WIDTH,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasLayout {
	pub cell_width: u32,
	pub cell_height: u32,
	/// Cells per atlas row.
	pub cells_per_row: u32,
	/// Number of cell rows.
	pub rows: u32,
	pub width: u32,
	pub height: u32,
	/// Pixel offset of each texture, in input order.
	pub locations: Vec<(u32, u32)>,
}

impl AtlasLayout {
	/// Lay out textures of the given `(name, width, height)`.
	pub fn compute(sizes: &[(&str, u32, u32)], config: &AtlasConfig) -> Result<Self> {
		let mut cell_width = 0;
		let mut cell_height = 0;
		for &(name, width, height) in sizes {
			if width > config.max_row_width {
				return Err(Error::TextureTooWide {
					texture: name.to_string(),
					width,
					max_row_width: config.max_row_width,
				});
			}
			cell_width = cell_width.max(width);
			cell_height = cell_height.max(height);
		}

		if sizes.is_empty() || cell_width == 0 {
			return Ok(AtlasLayout {
				cell_width,
				cell_height,
				cells_per_row: 0,
				rows: 0,
				width: 0,
				height: 0,
				locations: vec![(0, 0); sizes.len()],
			});
		}

		let cells_per_row = config.max_row_width / cell_width;
		let rows = (sizes.len() as u32).div_ceil(cells_per_row);
		let locations = (0..sizes.len() as u32)
			.map(|i| ((i % cells_per_row) * cell_width, (i / cells_per_row) * cell_height))
			.collect();

		Ok(AtlasLayout {
			cell_width,
			cell_height,
			cells_per_row,
			rows,
			width: cells_per_row * cell_width,
			height: rows * cell_height,
			locations,
		})
	}

	pub fn size(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	/// `(row, column)` of the i-th texture.
	pub fn cell(&self, index: usize) -> (u32, u32) {
		if self.cells_per_row == 0 {
			return (0, 0);
		}
		let i = index as u32;
		(i / self.cells_per_row, i % self.cells_per_row)
	}

	/// Copy each texture into its cell. Unused space stays transparent black.
	pub fn compose(&self, textures: &[&TextureImage]) -> Result<RgbaImage> {
		if textures.len() != self.locations.len() {
			return Err(Error::InvalidData(format!(
				"atlas laid out for {} textures, got {}",
				self.locations.len(),
				textures.len()
			)));
		}
		let mut atlas = RgbaImage::new(self.width, self.height);
		for (texture, &(left, top)) in textures.iter().zip(&self.locations) {
			let (width, height) = texture.dimensions();
			if width > self.cell_width || height > self.cell_height {
				return Err(Error::InvalidData(format!(
					"texture {} ({}x{}) does not fit an atlas cell of {}x{}",
					texture.name(),
					width,
					height,
					self.cell_width,
					self.cell_height
				)));
			}
			for y in 0..height {
				for x in 0..width {
					atlas.put_pixel(left + x, top + y, Rgba(texture.rgba(x, y)));
				}
			}
		}
		Ok(atlas)
	}
}
