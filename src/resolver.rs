//! Bone tree → world-space cube instances
//!
//! Poses accumulate from the root bone down. Each cube ends up with a world
//! origin, a zoomed size, a single rotation quaternion and normalised UVs, in
//! a stable depth-first order that the packing layer indexes by position.

use crate::models::{Bone, Model};
use crate::pose::{PoseTransform, Quaternion};
use crate::uv::AtlasMapping;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCube {
	pub origin: [f64; 3],
	pub size: [f64; 3],
	/// World rotation with `w >= 0`.
	pub rotation: Quaternion,
	/// East, south, west, north, up, down as `[u, v, width, height]`.
	pub uv: [[f64; 4]; 6],
	/// Glow and metallic, zero when the model has no material.
	pub material: [f64; 2],
}

/// Where a model sits in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
	pub pose: PoseTransform,
	pub zoom: f64,
}

impl Default for Placement {
	fn default() -> Self {
		Placement {
			pose: PoseTransform::IDENTITY,
			zoom: 1.0,
		}
	}
}

impl Placement {
	pub fn new(position: [f64; 3], rotation: [f64; 3], zoom: f64) -> Self {
		Placement {
			pose: PoseTransform::placement(rotation, position),
			zoom,
		}
	}
}

/// Resolve every cube of `model`, appending to `out`.
pub fn resolve_model(
	model: &Model,
	placement: &Placement,
	mapping: &AtlasMapping,
	out: &mut Vec<ResolvedCube>,
) {
	let material = model
		.material
		.map_or([0.0, 0.0], |m| [m.glow, m.metallic]);
	let ctx = ResolveContext {
		placement,
		mapping,
		material,
	};
	for bone in &model.bones {
		push_cubes(bone, &PoseTransform::IDENTITY, &ctx, out);
	}
}

/// Resolve a single model on its own texture, at the world origin.
pub fn resolve_standalone(model: &Model) -> Vec<ResolvedCube> {
	let mut cubes = Vec::with_capacity(model.cube_count());
	let mapping = AtlasMapping::standalone(model.texture.declared_size);
	resolve_model(model, &Placement::default(), &mapping, &mut cubes);
	cubes
}

struct ResolveContext<'a> {
	placement: &'a Placement,
	mapping: &'a AtlasMapping,
	material: [f64; 2],
}

fn push_cubes(
	bone: &Bone,
	parent_pose: &PoseTransform,
	ctx: &ResolveContext<'_>,
	out: &mut Vec<ResolvedCube>,
) {
	let bone_pose = parent_pose.compose(&PoseTransform::from_euler_pivot(bone.rotation, bone.pivot));
	let zoom = ctx.placement.zoom;
	let model_pose = &ctx.placement.pose;

	for cube in &bone.cubes {
		let cube_pose = bone_pose.compose(&PoseTransform::from_euler_pivot(cube.rotation, cube.pivot));
		let local = cube_pose.apply(&Quaternion::point(cube.origin)).scaled(zoom);
		let origin = model_pose.apply(&local);
		let rotation = model_pose.rotation.hamilton(&cube_pose.rotation).canonical();

		out.push(ResolvedCube {
			origin: origin.vector(),
			size: cube.size.map(|s| s * zoom),
			rotation,
			uv: ctx.mapping.normalize(&cube.uv),
			material: ctx.material,
		});
	}

	for child in &bone.children {
		push_cubes(child, &bone_pose, ctx, out);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::log::NullLogger;
	use crate::models::Material;
	use crate::texture::TextureInfo;
	use serde_json::{json, Value};

	const EPS: f64 = 1e-9;

	fn model(bones: Value) -> Model {
		let json = json!({
			"format_version": "1.10.0",
			"geometry.model": { "texturewidth": 16, "textureheight": 16, "bones": bones }
		});
		Model::from_json(&json, "test.json", TextureInfo::new("t.png", (16, 16)), &NullLogger).unwrap()
	}

	fn assert_vec_eq(a: [f64; 3], b: [f64; 3]) {
		for i in 0..3 {
			assert!((a[i] - b[i]).abs() < EPS, "{:?} != {:?}", a, b);
		}
	}

	#[test]
	fn test_identity_cube_lands_on_placement() {
		let model = model(json!([{
			"name": "root",
			"pivot": [0, 0, 0],
			"cubes": [{ "origin": [-1, 0, 0], "size": [1, 1, 1], "uv": [0, 0] }]
		}]));
		// origin x = -(-1) - 1 = 0 after the handedness flip
		assert_eq!(model.bones[0].cubes[0].origin, [0.0, 0.0, 0.0]);

		let placement = Placement::new([3.0, -2.0, 7.5], [0.0, 0.0, 0.0], 1.0);
		let mut cubes = Vec::new();
		resolve_model(&model, &placement, &AtlasMapping::standalone((16, 16)), &mut cubes);

		assert_eq!(cubes.len(), 1);
		assert_vec_eq(cubes[0].origin, [3.0, -2.0, 7.5]);
		assert_eq!(cubes[0].rotation, Quaternion::IDENTITY);
		assert_eq!(cubes[0].size, [1.0, 1.0, 1.0]);
	}

	#[test]
	fn test_zoom_scales_origin_and_size() {
		let model = model(json!([{
			"name": "root",
			"pivot": [0, 0, 0],
			"cubes": [{ "origin": [-3, 2, 1], "size": [1, 2, 3], "uv": [0, 0] }]
		}]));
		let placement = Placement::new([10.0, 0.0, 0.0], [0.0, 0.0, 0.0], 2.0);
		let mut cubes = Vec::new();
		resolve_model(&model, &placement, &AtlasMapping::standalone((16, 16)), &mut cubes);

		assert_vec_eq(cubes[0].origin, [10.0 + 2.0 * 2.0, 4.0, 2.0]);
		assert_eq!(cubes[0].size, [2.0, 4.0, 6.0]);
	}

	#[test]
	fn test_bone_rotation_about_pivot() {
		// Z angles keep their sign through the handedness flip
		let model = model(json!([{
			"name": "root",
			"pivot": [0, 1, 0],
			"rotation": [0, 0, 90],
			"cubes": [{ "origin": [-2, 1, 0], "size": [1, 1, 1], "uv": [0, 0] }]
		}]));
		let cubes = resolve_standalone(&model);
		// local origin (1, 1, 0) rotated 90 degrees about Z through (0, 1, 0) -> (0, 2, 0)
		assert_vec_eq(cubes[0].origin, [0.0, 2.0, 0.0]);
		let half = std::f64::consts::FRAC_1_SQRT_2;
		assert!((cubes[0].rotation.w - half).abs() < EPS);
		assert!((cubes[0].rotation.z - half).abs() < EPS);
	}

	#[test]
	fn test_nested_bones_compose() {
		let model = model(json!([
			{ "name": "body", "pivot": [0, 0, 0], "rotation": [0, 0, 90] },
			{
				"name": "arm",
				"parent": "body",
				"pivot": [0, 0, 0],
				"rotation": [0, 0, 90],
				"cubes": [{ "origin": [-2, 0, 0], "size": [1, 1, 1], "uv": [0, 0] }]
			}
		]));
		let cubes = resolve_standalone(&model);
		// (1, 0, 0) rotated 180 degrees about Z
		assert_vec_eq(cubes[0].origin, [-1.0, 0.0, 0.0]);
		assert!(cubes[0].rotation.w.abs() < EPS);
		assert!((cubes[0].rotation.z.abs() - 1.0).abs() < EPS);
	}

	#[test]
	fn test_rotation_sign_is_canonical() {
		// 270 degrees about Z yields a quaternion with negative w before canonicalisation
		let model = model(json!([{
			"name": "root",
			"pivot": [0, 0, 0],
			"rotation": [0, 0, 270],
			"cubes": [{ "origin": [0, 0, 0], "size": [1, 1, 1], "uv": [0, 0] }]
		}]));
		let raw = Quaternion::from_euler_degrees([0.0, 0.0, 270.0]);
		assert!(raw.w < 0.0);

		let cubes = resolve_standalone(&model);
		assert!(cubes[0].rotation.w >= 0.0);
		assert!((cubes[0].rotation.z + raw.z).abs() < EPS);
	}

	#[test]
	fn test_depth_first_declaration_order() {
		let model = model(json!([
			{
				"name": "a",
				"pivot": [0, 0, 0],
				"cubes": [
					{ "origin": [0, 0, 0], "size": [1, 1, 1], "uv": [0, 0] },
					{ "origin": [0, 0, 0], "size": [2, 1, 1], "uv": [0, 0] }
				]
			},
			{
				"name": "b",
				"parent": "a",
				"pivot": [0, 0, 0],
				"cubes": [{ "origin": [0, 0, 0], "size": [3, 1, 1], "uv": [0, 0] }]
			},
			{
				"name": "c",
				"pivot": [0, 0, 0],
				"cubes": [{ "origin": [0, 0, 0], "size": [4, 1, 1], "uv": [0, 0] }]
			},
			{
				"name": "d",
				"parent": "a",
				"pivot": [0, 0, 0],
				"cubes": [{ "origin": [0, 0, 0], "size": [5, 1, 1], "uv": [0, 0] }]
			}
		]));
		let widths: Vec<f64> = resolve_standalone(&model).iter().map(|c| c.size[0]).collect();
		assert_eq!(widths, [1.0, 2.0, 3.0, 5.0, 4.0]);
	}

	#[test]
	fn test_uv_and_material_carried() {
		let model = model(json!([{
			"name": "root",
			"pivot": [0, 0, 0],
			"cubes": [{ "origin": [0, 0, 0], "size": [2, 2, 2], "uv": [0, 0] }]
		}]))
		.with_material(Material {
			glow: 0.5,
			metallic: 0.25,
		});
		let cubes = resolve_standalone(&model);
		assert_eq!(cubes[0].material, [0.5, 0.25]);
		// east face (0, 2, 2, 2) on a 16x16 texture
		assert_eq!(cubes[0].uv[0], [0.0, 0.125, 0.125, 0.125]);
		// down face keeps its negative height
		assert_eq!(cubes[0].uv[5], [0.25, 0.125, 0.125, -0.125]);
	}

	#[test]
	fn test_empty_model_resolves_to_nothing() {
		let model = model(json!([{ "name": "root", "pivot": [0, 0, 0] }]));
		assert!(resolve_standalone(&model).is_empty());
	}
}
