//! Skeletal animation evaluation for GPU skinning
//!
//! Given a node hierarchy, a bone table and keyframed animation clips, this
//! crate produces one 4x4 matrix per bone, in bone-index order, ready to be
//! uploaded as the bone palette of a skinning shader.
//!
//! # Example
//!
//! ```rust
//! use skeletal_anim::glam::{Mat4, Vec3};
//! use skeletal_anim::{
//!     AnimationClip, Keyframe, KeyframeTrack, MeshBone, MeshData, ModelBuilder,
//!     NodeAnimation, NodeHierarchy, VertexWeight,
//! };
//!
//! let mut hierarchy = NodeHierarchy::new("Root", Mat4::IDENTITY);
//! hierarchy.add_child(0, "Arm", Mat4::IDENTITY)?;
//!
//! let mut builder = ModelBuilder::new(hierarchy);
//! builder.add_mesh(&MeshData {
//!     name: "body".to_string(),
//!     vertex_count: 1,
//!     bones: vec![MeshBone {
//!         name: "Arm".to_string(),
//!         offset: Mat4::IDENTITY,
//!         weights: vec![VertexWeight { vertex: 0, weight: 1.0 }],
//!     }],
//! })?;
//! builder.add_clip(AnimationClip::new(
//!     "raise",
//!     10.0,
//!     10.0,
//!     vec![NodeAnimation::new("Arm").with_positions(KeyframeTrack::new(vec![
//!         Keyframe::new(0.0, Vec3::ZERO),
//!         Keyframe::new(10.0, Vec3::Y),
//!     ])?)],
//! ));
//! let model = builder.build()?;
//!
//! let mut bones = Vec::new();
//! model.bone_transforms(0.5, 0, &mut bones)?;
//! assert!(bones[0].transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-5));
//! # Ok::<(), skeletal_anim::AnimError>(())
//! ```

pub mod bones;
pub mod clip;
pub mod error;
pub mod evaluator;
pub mod hierarchy;
pub mod model;
pub mod player;
pub mod skinning;
pub mod track;

#[cfg(feature = "serde-support")]
pub mod scene;

#[cfg(feature = "gltf")]
pub mod gltf_import;

pub use glam;

// Re-export common types
pub use bones::{BoneInfo, BoneTable, MAX_NUM_BONES_PER_VERTEX, VertexBoneData};
pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
pub use error::{AnimError, Result};
pub use evaluator::Traversal;
pub use hierarchy::{Node, NodeHierarchy};
pub use model::{
    ImportOptions, MeshBone, MeshData, MeshEntry, ModelBuilder, SkinnedModel, VertexWeight,
};
pub use player::AnimationPlayer;
pub use skinning::SkinningOptions;
pub use track::{Keyframe, KeyframeTrack, LocalTransform, NodeAnimation};

#[cfg(feature = "serde-support")]
pub use scene::SceneDescription;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
