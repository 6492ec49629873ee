//! GPU-ready layouts for resolved cubes
//!
//! Two layouts are produced from the same [`ResolvedCube`] list:
//!
//! - a vertex buffer with one `#[repr(C)]` record per cube, described by a
//!   [`VertexLayout`] so the renderer can bind attributes without knowing the
//!   record type;
//! - four float textures (origin/size, rotation, uv, material) where cube `i`
//!   lives at `(i % cubes_per_row, i / cubes_per_row)` in cube units.

use crate::error::{Error, Result};
use crate::resolver::ResolvedCube;
use bytemuck::{Pod, Zeroable};
use std::mem::{offset_of, size_of};

pub const DEFAULT_CUBES_PER_ROW: u32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingConfig {
    pub cubes_per_row: u32,
}

impl Default for PackingConfig {
    fn default() -> Self {
        PackingConfig {
            cubes_per_row: DEFAULT_CUBES_PER_ROW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    F32,
}

impl ScalarType {
    pub const fn size(&self) -> usize {
        match self {
            ScalarType::F32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Shader input location.
    pub location: u32,
    pub components: u32,
    pub scalar: ScalarType,
    /// Byte offset inside the record.
    pub offset: usize,
}

impl VertexAttribute {
    pub const fn byte_size(&self) -> usize {
        self.components as usize * self.scalar.size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: &'static [VertexAttribute],
}

impl VertexLayout {
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

const fn f32_attribute(name: &'static str, location: u32, components: u32, offset: usize) -> VertexAttribute {
    VertexAttribute {
        name,
        location,
        components,
        scalar: ScalarType::F32,
        offset,
    }
}

/// A per-cube record that can be uploaded as a vertex buffer.
pub trait VertexRecord: Pod {
    const LAYOUT: VertexLayout;

    fn from_resolved(cube: &ResolvedCube) -> Self;
}

/// One cube as a single vertex. The rotation keeps only `x, y, z`; the shader
/// rebuilds `w = sqrt(1 - |xyz|^2)`, which is valid because resolved
/// rotations always have `w >= 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub origin: [f32; 3],
    pub size: [f32; 3],
    pub rotation: [f32; 3],
    pub east: [f32; 4],
    pub south: [f32; 4],
    pub west: [f32; 4],
    pub north: [f32; 4],
    pub up: [f32; 4],
    pub down: [f32; 4],
}

const CUBE_VERTEX_ATTRIBUTES: [VertexAttribute; 9] = [
    f32_attribute("origin", 0, 3, offset_of!(CubeVertex, origin)),
    f32_attribute("size", 1, 3, offset_of!(CubeVertex, size)),
    f32_attribute("rotation", 2, 3, offset_of!(CubeVertex, rotation)),
    f32_attribute("east", 3, 4, offset_of!(CubeVertex, east)),
    f32_attribute("south", 4, 4, offset_of!(CubeVertex, south)),
    f32_attribute("west", 5, 4, offset_of!(CubeVertex, west)),
    f32_attribute("north", 6, 4, offset_of!(CubeVertex, north)),
    f32_attribute("up", 7, 4, offset_of!(CubeVertex, up)),
    f32_attribute("down", 8, 4, offset_of!(CubeVertex, down)),
];

impl VertexRecord for CubeVertex {
    const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<CubeVertex>(),
        attributes: &CUBE_VERTEX_ATTRIBUTES,
    };

    fn from_resolved(cube: &ResolvedCube) -> Self {
        let uv = cube.uv.map(to_f32);
        CubeVertex {
            origin: to_f32(cube.origin),
            size: to_f32(cube.size),
            rotation: to_f32(cube.rotation.vector()),
            east: uv[0],
            south: uv[1],
            west: uv[2],
            north: uv[3],
            up: uv[4],
            down: uv[5],
        }
    }
}

/// [`CubeVertex`] followed by glow and metallic.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialCubeVertex {
    pub cube: CubeVertex,
    pub material: [f32; 2],
}

const MATERIAL_CUBE_VERTEX_ATTRIBUTES: [VertexAttribute; 10] = {
    let mut attributes = [f32_attribute("material", 9, 2, offset_of!(MaterialCubeVertex, material)); 10];
    let base = offset_of!(MaterialCubeVertex, cube);
    let mut i = 0;
    while i < CUBE_VERTEX_ATTRIBUTES.len() {
        let a = CUBE_VERTEX_ATTRIBUTES[i];
        attributes[i] = f32_attribute(a.name, a.location, a.components, base + a.offset);
        i += 1;
    }
    attributes
};

impl VertexRecord for MaterialCubeVertex {
    const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<MaterialCubeVertex>(),
        attributes: &MATERIAL_CUBE_VERTEX_ATTRIBUTES,
    };

    fn from_resolved(cube: &ResolvedCube) -> Self {
        MaterialCubeVertex {
            cube: CubeVertex::from_resolved(cube),
            material: to_f32(cube.material),
        }
    }
}

fn to_f32<const N: usize>(values: [f64; N]) -> [f32; N] {
    values.map(|v| v as f32)
}

pub fn vertex_buffer<T: VertexRecord>(cubes: &[ResolvedCube]) -> Vec<T> {
    cubes.iter().map(T::from_resolved).collect()
}

/// Raw bytes of a vertex buffer, ready for upload.
pub fn vertex_bytes<T: VertexRecord>(records: &[T]) -> &[u8] {
    bytemuck::cast_slice(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    Rg32F,
    Rgb32F,
    Rgba32F,
}

impl TexelFormat {
    pub const fn components(&self) -> usize {
        match self {
            TexelFormat::Rg32F => 2,
            TexelFormat::Rgb32F => 3,
            TexelFormat::Rgba32F => 4,
        }
    }
}

/// Row-major float texture, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    pub format: TexelFormat,
    pub data: Vec<f32>,
}

impl PixelGrid {
    /// Zero-filled grid.
    pub fn new(width: u32, height: u32, format: TexelFormat) -> Self {
        PixelGrid {
            width,
            height,
            format,
            data: vec![0.0; width as usize * height as usize * format.components()],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.format.components()
    }

    pub fn texel(&self, x: u32, y: u32) -> &[f32] {
        let i = self.index(x, y);
        &self.data[i..i + self.format.components()]
    }

    fn set(&mut self, x: u32, y: u32, values: &[f32]) {
        let i = self.index(x, y);
        self.data[i..i + values.len()].copy_from_slice(values);
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Little-endian bytes regardless of the host.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

/// Cube position in cube units inside the texture layout.
pub fn cube_texel(index: usize, cubes_per_row: u32) -> (u32, u32) {
    let i = index as u32;
    (i % cubes_per_row, i / cubes_per_row)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeTextures {
    pub cube_count: usize,
    pub cubes_per_row: u32,
    /// Two texels per cube: origin, then size.
    pub origin_size: PixelGrid,
    /// Full quaternion `(x, y, z, w)`.
    pub rotation: PixelGrid,
    /// Six texels per cube: east, south, west, north, up, down.
    pub uv: PixelGrid,
    /// Glow and metallic.
    pub material: PixelGrid,
}

impl CubeTextures {
    pub fn grids(&self) -> [(&'static str, &PixelGrid); 4] {
        [
            ("origin_size", &self.origin_size),
            ("rotation", &self.rotation),
            ("uv", &self.uv),
            ("material", &self.material),
        ]
    }
}

pub fn pack_textures(cubes: &[ResolvedCube], config: &PackingConfig) -> Result<CubeTextures> {
    let cpr = config.cubes_per_row;
    if cpr == 0 {
        return Err(Error::InvalidData(
            "cubes_per_row must be at least 1".to_string(),
        ));
    }
    let height = (cubes.len() as u32).div_ceil(cpr);

    let mut textures = CubeTextures {
        cube_count: cubes.len(),
        cubes_per_row: cpr,
        origin_size: PixelGrid::new(2 * cpr, height, TexelFormat::Rgb32F),
        rotation: PixelGrid::new(cpr, height, TexelFormat::Rgba32F),
        uv: PixelGrid::new(6 * cpr, height, TexelFormat::Rgba32F),
        material: PixelGrid::new(cpr, height, TexelFormat::Rg32F),
    };

    for (i, cube) in cubes.iter().enumerate() {
        let (x, y) = cube_texel(i, cpr);
        textures.origin_size.set(2 * x, y, &to_f32(cube.origin));
        textures.origin_size.set(2 * x + 1, y, &to_f32(cube.size));

        let q = cube.rotation;
        textures.rotation.set(x, y, &to_f32([q.x, q.y, q.z, q.w]));

        for (face, rect) in cube.uv.iter().enumerate() {
            textures.uv.set(6 * x + face as u32, y, &to_f32(*rect));
        }

        textures.material.set(x, y, &to_f32(cube.material));
    }

    Ok(textures)
}
