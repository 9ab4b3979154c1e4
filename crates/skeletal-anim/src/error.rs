use std::io;
use thiserror::Error;

/// Error types for skeletal animation import and evaluation
#[derive(Error, Debug)]
pub enum AnimError {
    /// I/O error while reading a scene file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Animation index is outside the model's clip list
    #[error("Invalid animation index {index}, model has {count} animations")]
    InvalidClipIndex { index: usize, count: usize },

    /// A node is animated in only one of the two blended clips
    #[error(
        "Unsupported blend configuration: node '{node}' is animated in only one of the start/end animations"
    )]
    UnsupportedBlendConfiguration { node: String },

    /// A bone or node name could not be found in the hierarchy
    #[error("Cannot find node '{name}' in the hierarchy")]
    MissingNode { name: String },

    /// Two nodes share the same name
    #[error("Duplicate node name '{name}' in the hierarchy")]
    DuplicateNode { name: String },

    /// Keyframe data is empty or out of order
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// A bone weight refers to a vertex the mesh does not have
    #[error("Mesh '{mesh}': vertex {vertex} out of range ({count} vertices)")]
    InvalidVertex {
        mesh: String,
        vertex: u32,
        count: u32,
    },

    /// A vertex binding refers to a bone past the end of the matrix palette
    #[error("Bone index {index} out of range ({count} bone matrices)")]
    InvalidBoneIndex { index: u32, count: usize },

    /// The model has more bones than the skinning palette can hold
    #[error(
        "The number of bones in the model ({count}) is larger than the maximum supported ({max})"
    )]
    TooManyBones { count: usize, max: usize },

    /// Clips were imported but no mesh carried any bones
    #[error("Model has animations but no bones")]
    AnimationsWithoutBones,

    /// Error while parsing a scene description
    #[error("Parse error: {0}")]
    Parse(String),

    /// Scene file extension is not recognised
    #[error("Unsupported scene format: {0}")]
    UnsupportedFormat(String),

    /// Error reported by the glTF loader
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
