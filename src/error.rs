//! Error types for model loading, atlas packing and scene construction
//!
//! Every variant is fatal for the load that produced it. Soft problems (such as
//! a texture whose real size differs from the size declared in the model) go
//! through the [`Logger`](crate::log::Logger) instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// `format_version` is missing, not a string, or not one of the two
    /// supported schema versions.
    #[error("{source_name}: unsupported format version {version:?}")]
    UnsupportedFormat { source_name: String, version: String },

    #[error("{source_name}: {context} does not have a `{field}` field")]
    MissingField {
        source_name: String,
        context: String,
        field: &'static str,
    },

    #[error("{source_name}: {context} has an invalid `{field}` field (expected {expected})")]
    InvalidField {
        source_name: String,
        context: String,
        field: &'static str,
        expected: &'static str,
    },

    /// A bone names a parent that was not declared before it.
    #[error("{source_name}: bone {bone} has a parent {parent} that does not exist")]
    UnknownParent {
        source_name: String,
        bone: String,
        parent: String,
    },

    #[error("{source_name}: could not find the texture size of {texture}")]
    MissingTextureSize { source_name: String, texture: String },

    #[error("texture {texture} is {width} pixels wide, atlas rows hold at most {max_row_width}")]
    TextureTooWide {
        texture: String,
        width: u32,
        max_row_width: u32,
    },

    #[error("texture {texture} has {channels} channels, only 3 and 4 are supported")]
    UnsupportedChannels { texture: String, channels: u8 },

    #[error("asset not available: {0}")]
    Asset(String),
}

impl Error {
    pub(crate) fn missing(source_name: &str, context: impl Into<String>, field: &'static str) -> Self {
        Error::MissingField {
            source_name: source_name.to_string(),
            context: context.into(),
            field,
        }
    }

    pub(crate) fn invalid(
        source_name: &str,
        context: impl Into<String>,
        field: &'static str,
        expected: &'static str,
    ) -> Self {
        Error::InvalidField {
            source_name: source_name.to_string(),
            context: context.into(),
            field,
            expected,
        }
    }
}
