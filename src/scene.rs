//! Scene description loading, atlas generation and cube array assembly
//!
//! A scene places several models in the world. All of their textures are
//! packed into one atlas so the renderer samples a single image; every
//! resolved cube then carries UVs normalised against that atlas.

use crate::asset_provider::{AssetProvider, FileAssetProvider};
use crate::atlas::{AtlasConfig, AtlasLayout};
use crate::error::{Error, Result};
use crate::log::Logger;
use crate::models::{parse_model, Material, Model};
use crate::resolver::{resolve_model, Placement, ResolvedCube};
use crate::texture::{TextureImage, TextureInfo};
use crate::uv::AtlasMapping;
use image::RgbaImage;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_WINDOW_NAME: &str = "RayTrace";

/// Scene file as written on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    pub window_size: [i32; 2],
    #[serde(default = "default_window_name")]
    pub window_name: String,
    pub camera: Camera,
    /// Relative to the scene file's directory.
    #[serde(default)]
    pub screenshot_save_path: Option<String>,
    #[serde(default)]
    pub atlas_max_width: Option<u32>,
    pub objects: Vec<ObjectDescription>,
}

fn default_window_name() -> String {
    DEFAULT_WINDOW_NAME.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Camera {
    pub position: [f64; 3],
    /// Yaw and pitch.
    pub orientation: [f64; 2],
    pub fov: f64,
    pub d: f64,
    pub keyboard_sensitivity: f64,
    pub mouse_rotation_sensitivity: f64,
    pub mouse_move_sensitivity: f64,
    pub mouse_zoom_sensitivity: f64,
    pub ctrl_sensitivity_modifier: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectDescription {
    pub position: [f64; 3],
    /// Euler angles in degrees.
    pub rotation: [f64; 3],
    pub zoom: f64,
    pub model: String,
    pub texture: String,
    #[serde(default)]
    pub glow: Option<f64>,
    #[serde(default)]
    pub metallic: Option<f64>,
}

impl ObjectDescription {
    fn material(&self) -> Option<Material> {
        if self.glow.is_none() && self.metallic.is_none() {
            return None;
        }
        Some(Material {
            glow: self.glow.unwrap_or(0.0),
            metallic: self.metallic.unwrap_or(0.0),
        })
    }
}

pub fn parse_scene(json: &str, source_name: &str) -> Result<SceneDescription> {
    serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("Scene file {} is invalid: {}", source_name, e)))
}

pub struct SceneObject {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub zoom: f64,
    pub model: Model,
    pub texture: TextureImage,
}

impl SceneObject {
    pub fn placement(&self) -> Placement {
        Placement::new(self.position, self.rotation, self.zoom)
    }
}

pub struct Scene {
    pub window_size: [i32; 2],
    pub window_name: String,
    pub camera: Camera,
    pub screenshot_save_path: PathBuf,
    pub atlas_config: AtlasConfig,
    pub atlas_layout: AtlasLayout,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Load a scene file, reading models and textures next to it.
    pub fn from_file(path: &Path, logger: &dyn Logger) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Asset(format!("Failed to open scene file {}: {}", path.display(), e))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let assets = FileAssetProvider::new(base);
        Self::load(&json, path, &assets, logger)
    }

    /// Load a scene from its JSON text. `scene_path` names the scene in
    /// messages and anchors `screenshot_save_path`; model and texture paths go
    /// through `assets` untouched.
    pub fn load(
        json: &str,
        scene_path: &Path,
        assets: &dyn AssetProvider,
        logger: &dyn Logger,
    ) -> Result<Self> {
        let source_name = scene_path.display().to_string();
        let description = parse_scene(json, &source_name)?;

        let scene_dir = scene_path.parent().unwrap_or_else(|| Path::new(""));
        let screenshot_save_path = match &description.screenshot_save_path {
            Some(path) => scene_dir.join(path),
            None => scene_dir.to_path_buf(),
        };
        let atlas_config = AtlasConfig {
            max_row_width: description
                .atlas_max_width
                .unwrap_or(AtlasConfig::default().max_row_width),
        };

        let mut objects = Vec::with_capacity(description.objects.len());
        for object in &description.objects {
            objects.push(load_object(object, assets, logger)?);
        }

        let mut scene = Scene {
            window_size: description.window_size,
            window_name: description.window_name,
            camera: description.camera,
            screenshot_save_path,
            atlas_config,
            atlas_layout: AtlasLayout::compute(&[], &atlas_config)?,
            objects,
        };
        scene.gen_atlas()?;

        logger.info(
            "scene",
            &format!(
                "Loaded scene {} with {} objects and {} cubes.",
                source_name,
                scene.objects.len(),
                scene.cube_count()
            ),
        );
        Ok(scene)
    }

    /// Lay out every object's texture in the shared atlas and record each
    /// texture's location on its model.
    pub fn gen_atlas(&mut self) -> Result<()> {
        let sizes: Vec<(&str, u32, u32)> = self
            .objects
            .iter()
            .map(|object| {
                let (width, height) = object.texture.dimensions();
                (object.texture.name(), width, height)
            })
            .collect();
        let layout = AtlasLayout::compute(&sizes, &self.atlas_config)?;

        for (object, location) in self.objects.iter_mut().zip(&layout.locations) {
            object.model.texture.location = *location;
        }
        self.atlas_layout = layout;
        Ok(())
    }

    pub fn atlas_size(&self) -> (u32, u32) {
        self.atlas_layout.size()
    }

    /// RGBA8 atlas pixels for the current layout.
    pub fn compose_atlas(&self) -> Result<RgbaImage> {
        let textures: Vec<&TextureImage> = self.objects.iter().map(|o| &o.texture).collect();
        self.atlas_layout.compose(&textures)
    }

    /// Every cube of every object, in object order, with atlas UVs.
    pub fn build_cube_array(&self) -> Vec<ResolvedCube> {
        let mut cubes = Vec::with_capacity(self.cube_count());
        let atlas_size = self.atlas_size();
        for object in &self.objects {
            let mapping = AtlasMapping::in_atlas(object.model.texture.location, atlas_size);
            resolve_model(&object.model, &object.placement(), &mapping, &mut cubes);
        }
        cubes
    }

    pub fn cube_count(&self) -> usize {
        self.objects.iter().map(|o| o.model.cube_count()).sum()
    }
}

fn load_object(
    object: &ObjectDescription,
    assets: &dyn AssetProvider,
    logger: &dyn Logger,
) -> Result<SceneObject> {
    let texture = TextureImage::from_bytes(&object.texture, &assets.load_bytes(&object.texture)?)?;
    let info = TextureInfo::new(&object.texture, texture.dimensions());

    let json = parse_model(&assets.load_string(&object.model)?)?;
    let mut model = Model::from_json(&json, &object.model, info, logger)?;
    if let Some(material) = object.material() {
        model = model.with_material(material);
    }

    Ok(SceneObject {
        position: object.position,
        rotation: object.rotation,
        zoom: object.zoom,
        model,
        texture,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_provider::MemoryAssetProvider;
    use crate::log::{LogLevel, MemoryLogger, NullLogger};
    use image::{DynamicImage, ImageFormat, Rgba};
    use serde_json::json;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn model_json(size: u32) -> String {
        json!({
            "format_version": "1.10.0",
            "geometry.model": {
                "texturewidth": size,
                "textureheight": size,
                "bones": [{
                    "name": "root",
                    "pivot": [0, 0, 0],
                    "cubes": [{ "origin": [-1, 0, 0], "size": [1, 1, 1], "uv": [0, 0] }]
                }]
            }
        })
        .to_string()
    }

    fn camera() -> serde_json::Value {
        json!({
            "position": [0, 0, -10],
            "orientation": [0, 0],
            "fov": 60,
            "d": 0.1,
            "keyboard_sensitivity": 1,
            "mouse_rotation_sensitivity": 1,
            "mouse_move_sensitivity": 1,
            "mouse_zoom_sensitivity": 1,
            "ctrl_sensitivity_modifier": 2
        })
    }

    #[test]
    fn test_parse_scene_defaults() {
        let json = json!({ "window_size": [800, 600], "camera": camera(), "objects": [] });
        let scene = parse_scene(&json.to_string(), "scene.json").unwrap();
        assert_eq!(scene.window_size, [800, 600]);
        assert_eq!(scene.window_name, "RayTrace");
        assert_eq!(scene.camera.fov, 60.0);
        assert!(scene.screenshot_save_path.is_none());
        assert!(scene.atlas_max_width.is_none());
    }

    #[test]
    fn test_parse_scene_rejects_missing_camera_field() {
        let mut partial = camera();
        partial.as_object_mut().unwrap().remove("fov");
        let json = json!({ "window_size": [800, 600], "camera": partial, "objects": [] });
        assert!(matches!(
            parse_scene(&json.to_string(), "scene.json"),
            Err(Error::Parse(_))
        ));

        let json = json!({ "window_size": [800], "camera": camera(), "objects": [] });
        assert!(parse_scene(&json.to_string(), "scene.json").is_err());
    }

    #[test]
    fn test_load_scene_with_atlas() {
        let json = json!({
            "window_size": [640, 480],
            "window_name": "demo",
            "camera": camera(),
            "screenshot_save_path": "shots",
            "atlas_max_width": 32,
            "objects": [
                { "position": [0, 0, 0], "rotation": [0, 0, 0], "zoom": 1, "model": "a.json", "texture": "a.png" },
                { "position": [5, 0, 0], "rotation": [0, 0, 0], "zoom": 2, "model": "b.json", "texture": "b.png", "glow": 0.75 },
                { "position": [0, 5, 0], "rotation": [0, 0, 0], "zoom": 1, "model": "a.json", "texture": "a.png" }
            ]
        });
        let assets = MemoryAssetProvider::default()
            .with("a.json", model_json(16))
            .with("b.json", model_json(16))
            .with("a.png", png(16, 16, [255, 0, 0, 255]))
            .with("b.png", png(16, 16, [0, 0, 255, 255]));
        let logger = MemoryLogger::default();
        let scene = Scene::load(&json.to_string(), Path::new("scenes/demo.json"), &assets, &logger).unwrap();

        assert_eq!(scene.window_name, "demo");
        assert_eq!(scene.screenshot_save_path, Path::new("scenes/shots"));
        assert_eq!(scene.atlas_size(), (32, 32));
        assert_eq!(scene.objects[1].model.texture.location, (16, 0));
        assert_eq!(scene.objects[2].model.texture.location, (0, 16));
        assert!(logger.count(LogLevel::Info) >= 1);

        let atlas = scene.compose_atlas().unwrap();
        assert_eq!(atlas.get_pixel(20, 4), &Rgba([0, 0, 255, 255]));
        assert_eq!(atlas.get_pixel(4, 20), &Rgba([255, 0, 0, 255]));
        assert_eq!(atlas.get_pixel(20, 20), &Rgba([0, 0, 0, 0]));

        let cubes = scene.build_cube_array();
        assert_eq!(cubes.len(), 3);
        assert_eq!(cubes[1].origin, [5.0, 0.0, 0.0]);
        assert_eq!(cubes[1].size, [2.0, 2.0, 2.0]);
        assert_eq!(cubes[1].material, [0.75, 0.0]);
        assert_eq!(cubes[0].material, [0.0, 0.0]);
        // east face of the second object: (16 + 0, 0 + 1) over a 32x32 atlas
        assert_eq!(cubes[1].uv[0], [0.5, 1.0 / 32.0, 1.0 / 32.0, 1.0 / 32.0]);
        assert_eq!(cubes[2].uv[0][1], (16.0 + 1.0) / 32.0);
    }

    #[test]
    fn test_screenshot_path_defaults_to_scene_dir() {
        let json = json!({ "window_size": [1, 1], "camera": camera(), "objects": [] });
        let scene = Scene::load(
            &json.to_string(),
            Path::new("scenes/empty.json"),
            &MemoryAssetProvider::default(),
            &NullLogger,
        )
        .unwrap();
        assert_eq!(scene.screenshot_save_path, Path::new("scenes"));
        assert_eq!(scene.atlas_size(), (0, 0));
        assert!(scene.build_cube_array().is_empty());
        assert_eq!(scene.atlas_config.max_row_width, 1024);
    }

    #[test]
    fn test_missing_asset_is_fatal() {
        let json = json!({
            "window_size": [1, 1],
            "camera": camera(),
            "objects": [
                { "position": [0, 0, 0], "rotation": [0, 0, 0], "zoom": 1, "model": "a.json", "texture": "a.png" }
            ]
        });
        let assets = MemoryAssetProvider::default().with("a.png", png(16, 16, [0, 0, 0, 255]));
        let result = Scene::load(&json.to_string(), Path::new("s.json"), &assets, &NullLogger);
        assert!(matches!(result, Err(Error::Asset(_))));
    }

    #[test]
    fn test_texture_wider_than_atlas_is_fatal() {
        let json = json!({
            "window_size": [1, 1],
            "camera": camera(),
            "atlas_max_width": 8,
            "objects": [
                { "position": [0, 0, 0], "rotation": [0, 0, 0], "zoom": 1, "model": "a.json", "texture": "a.png" }
            ]
        });
        let assets = MemoryAssetProvider::default()
            .with("a.json", model_json(16))
            .with("a.png", png(16, 16, [0, 0, 0, 255]));
        let result = Scene::load(&json.to_string(), Path::new("s.json"), &assets, &NullLogger);
        assert!(matches!(result, Err(Error::TextureTooWide { width: 16, .. })));
    }
}
