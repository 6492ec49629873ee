//! CLI entry point for the Bedrock cube packer

use bedrock_cube_packer::models::Model;
use bedrock_cube_packer::packing::{self, CubeTextures, PackingConfig};
use bedrock_cube_packer::resolver::{resolve_standalone, ResolvedCube};
use bedrock_cube_packer::{load_scene, CubeVertex, Logger, TracingLogger};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "bedrock-pack")]
#[command(version, about = "Resolve Bedrock cube models and pack them for the GPU", long_about = None)]
struct Cli {
	/// Logging verbosity level
	#[arg(short, long, default_value = "info")]
	log_level: tracing::Level,

	/// Cubes per row of the packed textures
	#[arg(long, default_value_t = packing::DEFAULT_CUBES_PER_ROW)]
	cubes_per_row: u32,

	/// Write the packed textures (little-endian f32) and vertex buffer here
	#[arg(long)]
	dump: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Load a scene file and pack every object into one atlas
	Scene { scene: PathBuf },

	/// Load a single model on its own texture
	Model { model: PathBuf, texture: PathBuf },
}

fn main() {
	let cli = Cli::parse();

	tracing_subscriber::fmt()
		.with_max_level(cli.log_level)
		.without_time()
		.compact()
		.init();

	if let Err(e) = run(&cli) {
		error!("{}", e);
		std::process::exit(1);
	}
}

fn run(cli: &Cli) -> bedrock_cube_packer::Result<()> {
	let logger = TracingLogger;
	let cubes = match &cli.command {
		Commands::Scene { scene } => load_scene(scene, &logger)?.cubes,
		Commands::Model { model, texture } => {
			let model = Model::from_files(model, texture, &logger)?;
			resolve_standalone(&model)
		}
	};

	let textures = packing::pack_textures(
		&cubes,
		&PackingConfig {
			cubes_per_row: cli.cubes_per_row,
		},
	)?;
	logger.info(
		"packing",
		&format!(
			"{} cubes, uv texture {}x{}",
			textures.cube_count, textures.uv.width, textures.uv.height
		),
	);

	if let Some(dir) = &cli.dump {
		dump(dir, &cubes, &textures)?;
		info!("Dumped packed data to {:?}", dir);
	}
	Ok(())
}

fn dump(dir: &Path, cubes: &[ResolvedCube], textures: &CubeTextures) -> bedrock_cube_packer::Result<()> {
	std::fs::create_dir_all(dir)?;
	for (name, grid) in textures.grids() {
		let file = dir.join(format!("{}_{}x{}.f32", name, grid.width, grid.height));
		std::fs::write(file, grid.to_le_bytes())?;
	}
	let vertices: Vec<CubeVertex> = packing::vertex_buffer(cubes);
	let floats: &[f32] = bytemuck::cast_slice(&vertices);
	let bytes: Vec<u8> = floats.iter().flat_map(|v| v.to_le_bytes()).collect();
	std::fs::write(dir.join("vertices.f32"), bytes)?;
	Ok(())
}
