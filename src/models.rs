//! Bedrock geometry data structures and parsing
//!
//! The model file is walked as a `serde_json::Value` rather than derived,
//! because most fields need a coordinate conversion on the way in: the X
//! coordinate of every origin and pivot is mirrored, and the X and Y Euler
//! angles change sign. After parsing, everything is in the renderer's
//! right-handed space and the tree is immutable.

use crate::error::{Error, Result};
use crate::log::Logger;
use crate::texture::TextureInfo;
use crate::uv::{CubeUv, Face, FaceRect};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// `"1.10.0"`: a single `geometry.model` object.
    V1_10,
    /// `"1.12.0"`: a `minecraft:geometry` array with a `description` per entry.
    V1_12,
}

impl FormatVersion {
    pub fn parse(version: &str) -> Option<Self> {
        match version {
            "1.10.0" => Some(FormatVersion::V1_10),
            "1.12.0" => Some(FormatVersion::V1_12),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    /// Minimum corner, already inflated.
    pub origin: [f64; 3],
    /// Extent, already inflated.
    pub size: [f64; 3],
    pub pivot: [f64; 3],
    /// Euler angles in degrees.
    pub rotation: [f64; 3],
    /// Face rectangles in texture pixels, mirroring applied.
    pub uv: CubeUv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub pivot: [f64; 3],
    pub rotation: [f64; 3],
    pub mirror: bool,
    pub children: Vec<Bone>,
    pub cubes: Vec<Cube>,
}

impl Bone {
    /// Cubes of this bone and all descendants.
    pub fn cube_count(&self) -> usize {
        self.cubes.len() + self.children.iter().map(Bone::cube_count).sum::<usize>()
    }

    pub fn bone_count(&self) -> usize {
        1 + self.children.iter().map(Bone::bone_count).sum::<usize>()
    }

    pub fn find(&self, name: &str) -> Option<&Bone> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// Optional material scalars forwarded to the shader per cube.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Material {
    pub glow: f64,
    pub metallic: f64,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub format: FormatVersion,
    /// Root bones in declaration order.
    pub bones: Vec<Bone>,
    pub texture: TextureInfo,
    pub material: Option<Material>,
}

impl Model {
    /// Build a model from an already parsed model document.
    ///
    /// `texture` describes the real image; its declared size is taken from the
    /// document, and a disagreement with the image is only logged.
    pub fn from_json(
        json: &Value,
        source_name: &str,
        mut texture: TextureInfo,
        logger: &dyn Logger,
    ) -> Result<Self> {
        let root = json
            .as_object()
            .ok_or_else(|| Error::Parse(format!("Model file {} is not a JSON object", source_name)))?;

        let version = match root.get("format_version") {
            Some(Value::String(v)) => v.as_str(),
            Some(_) => {
                return Err(Error::invalid(source_name, "model", "format_version", "a string"))
            }
            None => return Err(Error::missing(source_name, "model", "format_version")),
        };
        let format = FormatVersion::parse(version).ok_or_else(|| Error::UnsupportedFormat {
            source_name: source_name.to_string(),
            version: version.to_string(),
        })?;

        let mut bones = Vec::new();
        match format {
            FormatVersion::V1_10 => {
                let geometry = root
                    .get("geometry.model")
                    .ok_or_else(|| Error::missing(source_name, "model", "geometry.model"))?
                    .as_object()
                    .ok_or_else(|| {
                        Error::invalid(source_name, "model", "geometry.model", "an object")
                    })?;
                let declared =
                    declared_texture_size(geometry, "texturewidth", "textureheight", source_name, &texture)?;
                texture.check_declared_size(declared, source_name, logger);
                texture.declared_size = declared;
                bones.extend(read_bones(geometry, source_name, "geometry.model")?);
            }
            FormatVersion::V1_12 => {
                let geometries = root
                    .get("minecraft:geometry")
                    .ok_or_else(|| Error::missing(source_name, "model", "minecraft:geometry"))?
                    .as_array()
                    .ok_or_else(|| {
                        Error::invalid(source_name, "model", "minecraft:geometry", "an array")
                    })?;
                for (i, geometry) in geometries.iter().enumerate() {
                    let context = format!("geometry {}", i);
                    let geometry = geometry.as_object().ok_or_else(|| {
                        Error::invalid(source_name, context.clone(), "minecraft:geometry", "an array of objects")
                    })?;
                    let description = geometry
                        .get("description")
                        .ok_or_else(|| Error::missing(source_name, context.clone(), "description"))?
                        .as_object()
                        .ok_or_else(|| {
                            Error::invalid(source_name, context.clone(), "description", "an object")
                        })?;
                    let declared = declared_texture_size(
                        description,
                        "texture_width",
                        "texture_height",
                        source_name,
                        &texture,
                    )?;
                    texture.check_declared_size(declared, source_name, logger);
                    if i == 0 {
                        texture.declared_size = declared;
                    }
                    bones.extend(read_bones(geometry, source_name, &context)?);
                }
            }
        }

        let model = Model {
            format,
            bones,
            texture,
            material: None,
        };
        logger.info(
            "model",
            &format!(
                "Loaded model {} with {} bones and {} cubes.",
                source_name,
                model.bone_count(),
                model.cube_count()
            ),
        );
        Ok(model)
    }

    /// Read a model document and the size of its texture from disk.
    pub fn from_files(model_path: &Path, texture_path: &Path, logger: &dyn Logger) -> Result<Self> {
        let json = parse_model_from_file(model_path)?;
        let image_size = image::image_dimensions(texture_path)?;
        let texture = TextureInfo::new(&texture_path.display().to_string(), image_size);
        Self::from_json(&json, &model_path.display().to_string(), texture, logger)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn cube_count(&self) -> usize {
        self.bones.iter().map(Bone::cube_count).sum()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.iter().map(Bone::bone_count).sum()
    }

    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find_map(|bone| bone.find(name))
    }
}

pub fn parse_model(json: &str) -> Result<Value> {
    serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("Failed to parse model JSON: {}", e)))
}

pub fn parse_model_from_file(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    parse_model(&contents)
}

fn declared_texture_size(
    object: &Map<String, Value>,
    width_field: &'static str,
    height_field: &'static str,
    source_name: &str,
    texture: &TextureInfo,
) -> Result<(u32, u32)> {
    let read = |field: &'static str| -> Result<Option<u32>> {
        match object.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
                .map(|v| Some(v as u32))
                .ok_or_else(|| Error::invalid(source_name, "model", field, "an integer")),
        }
    };
    match (read(width_field)?, read(height_field)?) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(Error::MissingTextureSize {
            source_name: source_name.to_string(),
            texture: texture.name.clone(),
        }),
    }
}

/// A bone waiting for its children to be attached.
struct PendingBone {
    bone: Option<Bone>,
    children: Vec<usize>,
}

/// One forward pass over a `bones` array. Parents must be declared before
/// their children; the name lookup only lives for the duration of the pass.
fn read_bones(geometry: &Map<String, Value>, source_name: &str, context: &str) -> Result<Vec<Bone>> {
    let bones = geometry
        .get("bones")
        .ok_or_else(|| Error::missing(source_name, context, "bones"))?
        .as_array()
        .ok_or_else(|| Error::invalid(source_name, context, "bones", "an array"))?;

    let mut pending: Vec<PendingBone> = Vec::with_capacity(bones.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut roots = Vec::new();

    for json in bones {
        let object = json
            .as_object()
            .ok_or_else(|| Error::invalid(source_name, context, "bones", "an array of objects"))?;
        let name = match object.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(Error::invalid(source_name, "bone", "name", "a string")),
            None => return Err(Error::missing(source_name, "bone", "name")),
        };
        let bone_context = format!("bone {}", name);

        let parent = match object.get("parent") {
            None => None,
            Some(Value::String(parent)) => match by_name.get(parent) {
                Some(&index) => Some(index),
                None => {
                    return Err(Error::UnknownParent {
                        source_name: source_name.to_string(),
                        bone: name,
                        parent: parent.clone(),
                    })
                }
            },
            Some(_) => {
                return Err(Error::invalid(source_name, bone_context, "parent", "a string"))
            }
        };

        let pivot = read_vec3(object, "pivot", source_name, &bone_context)?
            .ok_or_else(|| Error::missing(source_name, bone_context.clone(), "pivot"))?;
        let rotation = read_vec3(object, "rotation", source_name, &bone_context)?.unwrap_or_default();
        let inherited = parent
            .and_then(|index| pending[index].bone.as_ref())
            .map_or(false, |bone| bone.mirror);
        let mirror = read_bool(object, "mirror", source_name, &bone_context)?.unwrap_or(inherited);

        let cubes = match object.get("cubes") {
            None => Vec::new(),
            Some(Value::Array(cubes)) => cubes
                .iter()
                .enumerate()
                .map(|(i, cube)| read_cube(cube, mirror, source_name, &format!("cube {} of {}", i, bone_context)))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(Error::invalid(source_name, bone_context, "cubes", "an array")),
        };

        let index = pending.len();
        pending.push(PendingBone {
            bone: Some(Bone {
                name: name.clone(),
                pivot: [-pivot[0], pivot[1], pivot[2]],
                rotation: [-rotation[0], -rotation[1], rotation[2]],
                mirror,
                children: Vec::new(),
                cubes,
            }),
            children: Vec::new(),
        });
        match parent {
            Some(parent) => pending[parent].children.push(index),
            None => roots.push(index),
        }
        by_name.insert(name, index);
    }

    Ok(roots
        .into_iter()
        .filter_map(|root| assemble(root, &mut pending))
        .collect())
}

fn assemble(index: usize, pending: &mut [PendingBone]) -> Option<Bone> {
    let mut bone = pending[index].bone.take()?;
    let children = std::mem::take(&mut pending[index].children);
    bone.children = children
        .into_iter()
        .filter_map(|child| assemble(child, pending))
        .collect();
    Some(bone)
}

fn read_cube(json: &Value, bone_mirror: bool, source_name: &str, context: &str) -> Result<Cube> {
    let object = json
        .as_object()
        .ok_or_else(|| Error::invalid(source_name, context, "cubes", "an array of objects"))?;

    let raw_origin = read_vec3(object, "origin", source_name, context)?
        .ok_or_else(|| Error::missing(source_name, context, "origin"))?;
    let raw_size = read_vec3(object, "size", source_name, context)?
        .ok_or_else(|| Error::missing(source_name, context, "size"))?;
    let pivot = read_vec3(object, "pivot", source_name, context)?.unwrap_or_default();
    let rotation = read_vec3(object, "rotation", source_name, context)?.unwrap_or_default();

    let mut origin = [-raw_origin[0] - raw_size[0], raw_origin[1], raw_origin[2]];
    let mut size = raw_size;
    if let Some(inflate) = object.get("inflate") {
        let inflate = inflate
            .as_f64()
            .ok_or_else(|| Error::invalid(source_name, context, "inflate", "a number"))?;
        for axis in 0..3 {
            origin[axis] -= inflate;
            size[axis] += inflate * 2.0;
        }
    }

    let mirror = read_bool(object, "mirror", source_name, context)?.unwrap_or(bone_mirror);

    let uv = match object.get("uv") {
        None => return Err(Error::missing(source_name, context, "uv")),
        Some(Value::Object(faces)) => read_face_uvs(faces, source_name, context)?,
        Some(Value::Array(anchor)) if anchor.len() == 2 => {
            let anchor = read_numbers::<2>(anchor)
                .ok_or_else(|| Error::invalid(source_name, context, "uv", "two numbers"))?;
            CubeUv::box_unwrap(anchor, raw_size)
        }
        Some(_) => {
            return Err(Error::invalid(
                source_name,
                context,
                "uv",
                "a per-face object or two numbers",
            ))
        }
    };
    let uv = if mirror { uv.mirrored() } else { uv };

    Ok(Cube {
        origin,
        size,
        pivot: [-pivot[0], pivot[1], pivot[2]],
        rotation: [-rotation[0], -rotation[1], rotation[2]],
        uv,
    })
}

/// Per-face form: `{"north": {"uv": [x, y], "uv_size": [w, h]}, ...}`.
/// Faces that are left out get an empty rectangle.
fn read_face_uvs(faces: &Map<String, Value>, source_name: &str, context: &str) -> Result<CubeUv> {
    let mut uv = CubeUv::default();
    for face in Face::ALL {
        let Some(entry) = faces.get(face.key()) else {
            continue;
        };
        let pair = |field: &str| {
            entry
                .get(field)
                .and_then(Value::as_array)
                .and_then(|values| read_numbers::<2>(values))
        };
        let (Some([x, y]), Some([w, h])) = (pair("uv"), pair("uv_size")) else {
            return Err(Error::invalid(
                source_name,
                format!("{} face {}", context, face.key()),
                "uv",
                "`uv` and `uv_size` pairs of numbers",
            ));
        };
        *uv.face_mut(face) = FaceRect::new(x, y, w, h);
    }
    Ok(uv)
}

fn read_numbers<const N: usize>(values: &[Value]) -> Option<[f64; N]> {
    if values.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.as_f64()?;
    }
    Some(out)
}

fn read_vec3(
    object: &Map<String, Value>,
    field: &'static str,
    source_name: &str,
    context: &str,
) -> Result<Option<[f64; 3]>> {
    match object.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_array()
            .and_then(|values| read_numbers::<3>(values))
            .map(Some)
            .ok_or_else(|| Error::invalid(source_name, context, field, "an array of 3 numbers")),
    }
}

fn read_bool(
    object: &Map<String, Value>,
    field: &'static str,
    source_name: &str,
    context: &str,
) -> Result<Option<bool>> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(Error::invalid(source_name, context, field, "a boolean")),
    }
}
