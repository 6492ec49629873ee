//! Texture images and the texture metadata carried by a model

use crate::error::{Error, Result};
use crate::log::Logger;
use image::DynamicImage;

/// A decoded texture with 8-bit RGB or RGBA pixels, rows top to bottom.
#[derive(Debug, Clone)]
pub struct TextureImage {
	name: String,
	width: u32,
	height: u32,
	channels: u8,
	pixels: Vec<u8>,
}

impl TextureImage {
	/// Wrap an already decoded pixel buffer.
	pub fn from_raw(
		name: &str,
		width: u32,
		height: u32,
		channels: u8,
		pixels: Vec<u8>,
	) -> Result<Self> {
		if channels != 3 && channels != 4 {
			return Err(Error::UnsupportedChannels {
				texture: name.to_string(),
				channels,
			});
		}
		let expected = width as usize * height as usize * channels as usize;
		if pixels.len() != expected {
			return Err(Error::InvalidData(format!(
				"texture {} has {} bytes of pixels, expected {}",
				name,
				pixels.len(),
				expected
			)));
		}
		Ok(TextureImage {
			name: name.to_string(),
			width,
			height,
			channels,
			pixels,
		})
	}

	/// Decode an encoded image (PNG bytes)
	pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self> {
		let image = image::load_from_memory(data)?;
		Self::from_image(name, image)
	}

	pub fn from_image(name: &str, image: DynamicImage) -> Result<Self> {
		let (width, height) = (image.width(), image.height());
		match image.color().channel_count() {
			3 => Self::from_raw(name, width, height, 3, image.into_rgb8().into_raw()),
			4 => Self::from_raw(name, width, height, 4, image.into_rgba8().into_raw()),
			channels => Err(Error::UnsupportedChannels {
				texture: name.to_string(),
				channels,
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Get texture dimensions
	pub fn dimensions(&self) -> (u32, u32) {
		(self.width, self.height)
	}

	pub fn channels(&self) -> u8 {
		self.channels
	}

	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Pixel as RGBA; 3-channel images report an opaque alpha.
	pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
		let stride = self.channels as usize;
		let i = (y as usize * self.width as usize + x as usize) * stride;
		let p = &self.pixels[i..i + stride];
		if stride == 4 {
			[p[0], p[1], p[2], p[3]]
		} else {
			[p[0], p[1], p[2], 255]
		}
	}
}

/// Texture metadata owned by a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
	pub name: String,
	/// Size written in the model file. UV rectangles are expressed in this space.
	pub declared_size: (u32, u32),
	/// Size of the real image.
	pub image_size: (u32, u32),
	/// Top-left corner of this texture inside a shared atlas.
	pub location: (u32, u32),
}

impl TextureInfo {
	/// Metadata for an image whose declared size is not known yet.
	pub fn new(name: &str, image_size: (u32, u32)) -> Self {
		TextureInfo {
			name: name.to_string(),
			declared_size: image_size,
			image_size,
			location: (0, 0),
		}
	}

	/// Warn (without failing) when a declared size disagrees with the image.
	pub fn check_declared_size(
		&self,
		declared: (u32, u32),
		source_name: &str,
		logger: &dyn Logger,
	) -> bool {
		if declared == self.image_size {
			return true;
		}
		logger.warn(
			"model",
			&format!(
				"Texture file {}'s texture size mismatch in model file {}: declared {}x{}, image is {}x{}.",
				self.name,
				source_name,
				declared.0,
				declared.1,
				self.image_size.0,
				self.image_size.1
			),
		);
		false
	}
}
