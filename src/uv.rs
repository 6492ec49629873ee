//! Per-face UV rectangles: box unwrap, mirroring and atlas normalisation
//!
//! Rectangles are kept in texture pixels until [`AtlasMapping::normalize`]
//! turns them into `[0, 1]` coordinates of whatever texture the shader samples
//! (the model's own texture or a shared atlas).

/// Rectangle in texture pixels. `width`/`height` may be negative: a negative
/// extent means the face is sampled right-to-left (or bottom-to-top).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceRect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl FaceRect {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		FaceRect {
			x,
			y,
			width,
			height,
		}
	}

	/// Same area sampled in the opposite horizontal direction.
	pub fn flipped_horizontally(&self) -> Self {
		FaceRect::new(self.x + self.width, self.y, -self.width, self.height)
	}

	pub fn to_array(&self) -> [f64; 4] {
		[self.x, self.y, self.width, self.height]
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
	East,
	South,
	West,
	North,
	Up,
	Down,
}

impl Face {
	/// Packing order shared with the shader.
	pub const ALL: [Face; 6] = [
		Face::East,
		Face::South,
		Face::West,
		Face::North,
		Face::Up,
		Face::Down,
	];

	pub fn key(&self) -> &'static str {
		match self {
			Face::East => "east",
			Face::South => "south",
			Face::West => "west",
			Face::North => "north",
			Face::Up => "up",
			Face::Down => "down",
		}
	}
}

/// The six face rectangles of one cube.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CubeUv {
	pub east: FaceRect,
	pub south: FaceRect,
	pub west: FaceRect,
	pub north: FaceRect,
	pub up: FaceRect,
	pub down: FaceRect,
}

impl CubeUv {
	/// Standard box unwrap anchored at `anchor`, using the floored cube size.
	///
	/// The `down` face keeps a negative height, matching how models authored
	/// for this layout expect the bottom face to be sampled.
	pub fn box_unwrap(anchor: [f64; 2], size: [f64; 3]) -> Self {
		let [x, y] = anchor;
		let dx = size[0].floor();
		let dy = size[1].floor();
		let dz = size[2].floor();

		CubeUv {
			east: FaceRect::new(x, y + dz, dz, dy),
			south: FaceRect::new(x + dz + dx + dz, y + dz, dx, dy),
			west: FaceRect::new(x + dz + dx, y + dz, dz, dy),
			north: FaceRect::new(x + dz, y + dz, dx, dy),
			up: FaceRect::new(x + dz, y, dx, dz),
			down: FaceRect::new(x + dz + dx, y + dz, dx, -dz),
		}
	}

	/// Mirror across the cube's X axis.
	///
	/// North, south, up and down flip in place. East and west trade their
	/// horizontal placement, each taking the other's flipped x range while
	/// keeping its own vertical range.
	pub fn mirrored(&self) -> Self {
		let east = self.east.flipped_horizontally();
		let west = self.west.flipped_horizontally();

		CubeUv {
			east: FaceRect::new(west.x, self.east.y, west.width, self.east.height),
			west: FaceRect::new(east.x, self.west.y, east.width, self.west.height),
			south: self.south.flipped_horizontally(),
			north: self.north.flipped_horizontally(),
			up: self.up.flipped_horizontally(),
			down: self.down.flipped_horizontally(),
		}
	}

	pub fn face(&self, face: Face) -> &FaceRect {
		match face {
			Face::East => &self.east,
			Face::South => &self.south,
			Face::West => &self.west,
			Face::North => &self.north,
			Face::Up => &self.up,
			Face::Down => &self.down,
		}
	}

	pub fn face_mut(&mut self, face: Face) -> &mut FaceRect {
		match face {
			Face::East => &mut self.east,
			Face::South => &mut self.south,
			Face::West => &mut self.west,
			Face::North => &mut self.north,
			Face::Up => &mut self.up,
			Face::Down => &mut self.down,
		}
	}
}

/// Where a model's texture lives inside the sampled texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasMapping {
	pub offset: [f64; 2],
	pub size: [f64; 2],
}

impl AtlasMapping {
	/// The model's texture is sampled on its own.
	pub fn standalone(texture_size: (u32, u32)) -> Self {
		AtlasMapping {
			offset: [0.0, 0.0],
			size: [texture_size.0 as f64, texture_size.1 as f64],
		}
	}

	pub fn in_atlas(location: (u32, u32), atlas_size: (u32, u32)) -> Self {
		AtlasMapping {
			offset: [location.0 as f64, location.1 as f64],
			size: [atlas_size.0 as f64, atlas_size.1 as f64],
		}
	}

	pub fn normalize_rect(&self, rect: &FaceRect) -> [f64; 4] {
		let [w, h] = self.size;
		[
			(rect.x + self.offset[0]) / w,
			(rect.y + self.offset[1]) / h,
			rect.width / w,
			rect.height / h,
		]
	}

	/// All six faces in [`Face::ALL`] order.
	pub fn normalize(&self, uv: &CubeUv) -> [[f64; 4]; 6] {
		Face::ALL.map(|face| self.normalize_rect(uv.face(face)))
	}
}
