//! WASM bindings for browser integration
//!
//! The browser has no filesystem, so callers pass every model and texture up
//! front as parallel path/byte arrays; scene files refer to them by path.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::asset_provider::MemoryAssetProvider;
use crate::log::TracingLogger;
use crate::models::{parse_model, Model};
use crate::packing::{pack_textures, CubeTextures, PackingConfig, PixelGrid};
use crate::resolver::resolve_standalone;
use crate::texture::{TextureImage, TextureInfo};
use crate::{LoadedScene, Scene};

#[derive(Serialize)]
struct GridOutput {
	width: u32,
	height: u32,
	components: usize,
	data: Vec<f32>,
}

impl From<PixelGrid> for GridOutput {
	fn from(grid: PixelGrid) -> Self {
		GridOutput {
			width: grid.width,
			height: grid.height,
			components: grid.format.components(),
			data: grid.data,
		}
	}
}

#[derive(Serialize)]
struct PackedOutput {
	cube_count: usize,
	cubes_per_row: u32,
	origin_size: GridOutput,
	rotation: GridOutput,
	uv: GridOutput,
	material: GridOutput,
	atlas_width: u32,
	atlas_height: u32,
	/// RGBA8, rows top to bottom.
	atlas: Vec<u8>,
}

impl PackedOutput {
	fn new(textures: CubeTextures, atlas: image::RgbaImage) -> Self {
		PackedOutput {
			cube_count: textures.cube_count,
			cubes_per_row: textures.cubes_per_row,
			origin_size: textures.origin_size.into(),
			rotation: textures.rotation.into(),
			uv: textures.uv.into(),
			material: textures.material.into(),
			atlas_width: atlas.width(),
			atlas_height: atlas.height(),
			atlas: atlas.into_raw(),
		}
	}
}

fn js_error(context: &str) -> impl Fn(crate::Error) -> JsValue + '_ {
	move |e| JsValue::from_str(&format!("{}: {}", context, e))
}

/// Pack a scene into the four cube textures and the shared atlas
///
/// # Arguments
/// * `scene_json` - Scene description JSON string
/// * `asset_paths` - Paths of the models and textures named by the scene
/// * `asset_bytes` - Contents of each path, in the same order
/// * `cubes_per_row` - Cube columns of the packed textures (0 for the default)
#[wasm_bindgen]
pub fn pack_scene_textures(
	scene_json: &str,
	asset_paths: Vec<String>,
	asset_bytes: Vec<js_sys::Uint8Array>,
	cubes_per_row: u32,
) -> Result<JsValue, JsValue> {
	let asset_bytes: Vec<Vec<u8>> = asset_bytes.into_iter().map(|b| b.to_vec()).collect();
	let provider =
		MemoryAssetProvider::new(asset_paths, asset_bytes).map_err(js_error("Asset map error"))?;

	let scene = Scene::load(scene_json, std::path::Path::new("scene.json"), &provider, &TracingLogger)
		.map_err(js_error("Scene load error"))?;
	let loaded = LoadedScene::from_scene(scene).map_err(js_error("Atlas error"))?;
	let textures = loaded
		.texture_grids(&packing_config(cubes_per_row))
		.map_err(js_error("Packing error"))?;

	serde_wasm_bindgen::to_value(&PackedOutput::new(textures, loaded.atlas_image))
		.map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Pack a single model sampled from its own texture
#[wasm_bindgen]
pub fn pack_model_textures(
	model_json: &str,
	texture_bytes: &[u8],
	cubes_per_row: u32,
) -> Result<JsValue, JsValue> {
	let texture =
		TextureImage::from_bytes("texture", texture_bytes).map_err(js_error("Texture load error"))?;
	let json = parse_model(model_json).map_err(js_error("Model parse error"))?;
	let model = Model::from_json(
		&json,
		"model",
		TextureInfo::new("texture", texture.dimensions()),
		&TracingLogger,
	)
	.map_err(js_error("Model parse error"))?;

	let cubes = resolve_standalone(&model);
	let textures =
		pack_textures(&cubes, &packing_config(cubes_per_row)).map_err(js_error("Packing error"))?;
	let atlas = image::RgbaImage::from_fn(texture.dimensions().0, texture.dimensions().1, |x, y| {
		image::Rgba(texture.rgba(x, y))
	});

	serde_wasm_bindgen::to_value(&PackedOutput::new(textures, atlas))
		.map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn packing_config(cubes_per_row: u32) -> PackingConfig {
	if cubes_per_row == 0 {
		PackingConfig::default()
	} else {
		PackingConfig { cubes_per_row }
	}
}
