//! Where scene, model and texture bytes come from
//!
//! Scene files refer to models and textures by path. On the command line
//! those paths are resolved against the scene's directory; in the browser the
//! caller hands over every file up front.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

pub trait AssetProvider {
	fn load_bytes(&self, path: &str) -> Result<Vec<u8>>;

	fn load_string(&self, path: &str) -> Result<String> {
		String::from_utf8(self.load_bytes(path)?)
			.map_err(|e| Error::Asset(format!("{} is not valid UTF-8: {}", path, e)))
	}
}

/// Reads relative paths from a base directory. Absolute paths are used as is.
#[derive(Debug, Clone)]
pub struct FileAssetProvider {
	base_path: PathBuf,
}

impl FileAssetProvider {
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
		}
	}

	pub fn resolve(&self, path: &str) -> PathBuf {
		self.base_path.join(path)
	}
}

impl AssetProvider for FileAssetProvider {
	fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
		let full_path = self.resolve(path);
		std::fs::read(&full_path).map_err(|e| {
			Error::Asset(format!("could not read {}: {}", full_path.display(), e))
		})
	}
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAssetProvider {
	assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetProvider {
	pub fn new(asset_paths: Vec<String>, asset_bytes: Vec<Vec<u8>>) -> Result<Self> {
		if asset_paths.len() != asset_bytes.len() {
			return Err(Error::InvalidData(format!(
				"got {} asset paths but {} asset buffers",
				asset_paths.len(),
				asset_bytes.len()
			)));
		}

		Ok(Self {
			assets: asset_paths.into_iter().zip(asset_bytes).collect(),
		})
	}

	pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
		self.assets.insert(path.to_string(), bytes);
	}

	pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
		self.insert(path, bytes.into());
		self
	}
}

impl AssetProvider for MemoryAssetProvider {
	fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
		self.assets
			.get(path)
			.cloned()
			.ok_or_else(|| Error::Asset(format!("{} was not provided", path)))
	}
}
