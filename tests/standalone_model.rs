//! Single models loaded from disk and resolved against their own texture.

use bedrock_cube_packer::models::{FormatVersion, Model};
use bedrock_cube_packer::packing::{pack_textures, PackingConfig};
use bedrock_cube_packer::resolver::resolve_standalone;
use bedrock_cube_packer::{LogLevel, MemoryLogger};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn texture(name: &str, width: u32, height: u32) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bedrock-pack-{}-{}", std::process::id(), name));
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_multi_geometry_model() {
    let texture = texture("crate-ok.png", 32, 32);
    let logger = MemoryLogger::default();
    let model = Model::from_files(&fixture("crate.geo.json"), &texture, &logger).unwrap();
    std::fs::remove_file(&texture).unwrap();

    assert_eq!(model.format, FormatVersion::V1_12);
    let names: Vec<_> = model.bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["base", "lid"]);
    assert_eq!(model.texture.declared_size, (32, 32));
    assert_eq!(logger.count(LogLevel::Warn), 0);

    let cubes = resolve_standalone(&model);
    assert_eq!(cubes.len(), 2);
    assert_eq!(cubes[0].uv[3], [0.0, 0.0, 0.5, 0.5]);
    // up face authored upside down
    assert_eq!(cubes[0].uv[4], [0.5, 1.0, 0.5, -0.5]);

    let lid = &cubes[1];
    assert!(lid.rotation.w >= 0.0);
    assert!((lid.rotation.norm() - 1.0).abs() < 1e-9);
    // bone and cube rotations both act on the lid
    assert!(lid.rotation.y.abs() > 1e-3);
    assert!(lid.rotation.z.abs() > 1e-3);
}

#[test]
fn test_texture_size_mismatch_is_a_warning() {
    let texture = texture("crate-wide.png", 64, 32);
    let logger = MemoryLogger::default();
    let model = Model::from_files(&fixture("crate.geo.json"), &texture, &logger).unwrap();
    std::fs::remove_file(&texture).unwrap();

    // once per geometry
    assert_eq!(logger.count(LogLevel::Warn), 2);
    assert_eq!(model.texture.declared_size, (32, 32));
    assert_eq!(model.texture.image_size, (64, 32));

    // UVs stay in the declared space
    let cubes = resolve_standalone(&model);
    assert_eq!(cubes[0].uv[3][2], 0.5);
}

#[test]
fn test_legacy_biped_packs() {
    let texture = texture("biped.png", 64, 64);
    let model = Model::from_files(&fixture("biped.geo.json"), &texture, &MemoryLogger::default()).unwrap();
    std::fs::remove_file(&texture).unwrap();

    assert_eq!(model.format, FormatVersion::V1_10);
    assert_eq!(model.bone_count(), 4);
    assert!(model.find_bone("leftArm").unwrap().mirror);
    assert!(!model.find_bone("rightArm").unwrap().mirror);

    let cubes = resolve_standalone(&model);
    let textures = pack_textures(&cubes, &PackingConfig { cubes_per_row: 2 }).unwrap();
    assert_eq!(textures.cube_count, 5);
    assert_eq!(textures.rotation.height, 3);

    // right arm hangs from its shoulder: the pivot itself does not move
    let arm = model.find_bone("rightArm").unwrap();
    assert_eq!(arm.pivot, [5.0, 22.0, 0.0]);
    assert_eq!(arm.rotation, [30.0, 0.0, 0.0]);
    assert_eq!(cubes[3].size, [4.0, 12.0, 4.0]);
    assert!(cubes[3].rotation.x.abs() > 0.2);
}
