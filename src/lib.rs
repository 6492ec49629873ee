//! Bedrock cube model packer
//!
//! Loads Bedrock-edition cuboid models (bones and cubes) and whole scenes of
//! placed models, resolves every cube to a world-space pose, packs the
//! textures into a shared atlas and lays the result out for the GPU, either
//! as one vertex per cube or as a set of float textures.

pub mod asset_provider;
pub mod atlas;
pub mod error;
pub mod log;
pub mod models;
pub mod packing;
pub mod pose;
pub mod resolver;
pub mod scene;
pub mod texture;
pub mod uv;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::Error;
pub use error::Result;
pub use log::{LogLevel, Logger, MemoryLogger, NullLogger, TracingLogger};
pub use packing::{CubeTextures, CubeVertex, MaterialCubeVertex, PackingConfig, VertexRecord};
pub use resolver::ResolvedCube;
pub use scene::Scene;

/// A scene with its atlas composed and every cube resolved.
pub struct LoadedScene {
	pub scene: Scene,
	pub atlas_image: image::RgbaImage,
	pub cubes: Vec<ResolvedCube>,
}

impl LoadedScene {
	pub fn from_scene(scene: Scene) -> Result<Self> {
		let atlas_image = scene.compose_atlas()?;
		let cubes = scene.build_cube_array();
		Ok(LoadedScene {
			scene,
			atlas_image,
			cubes,
		})
	}

	pub fn vertex_buffer<T: VertexRecord>(&self) -> Vec<T> {
		packing::vertex_buffer(&self.cubes)
	}

	pub fn texture_grids(&self, config: &PackingConfig) -> Result<CubeTextures> {
		packing::pack_textures(&self.cubes, config)
	}
}

/// High-level API: load a scene file with the models and textures it names
/// (paths relative to the scene's directory).
pub fn load_scene(path: &std::path::Path, logger: &dyn Logger) -> Result<LoadedScene> {
	let scene = Scene::from_file(path, logger)?;
	let loaded = LoadedScene::from_scene(scene)?;
	let (width, height) = loaded.atlas_image.dimensions();
	logger.info(
		"atlas",
		&format!(
			"Packed {} textures into a {}x{} atlas.",
			loaded.scene.objects.len(),
			width,
			height
		),
	);
	Ok(loaded)
}
