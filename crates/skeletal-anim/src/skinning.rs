//! CPU vertex skinning
//!
//! Applies evaluated bone matrices to bind-pose positions:
//! `p' = Σ wᵢ · Mᵢ · p` over the (up to four) influences of a vertex.
//! This mirrors what the skinning vertex shader does and is useful for
//! validation and headless tools.
//!
//! # Example
//!
//! ```rust
//! use skeletal_anim::bones::VertexBoneData;
//! use skeletal_anim::skinning::{skin_position, SkinningOptions};
//! use glam::{Mat4, Vec3};
//!
//! let mut binding = VertexBoneData::default();
//! binding.add_bone_data(0, 1.0);
//!
//! let matrices = [Mat4::from_translation(Vec3::Y)];
//! let p = skin_position(&matrices, &binding, Vec3::ZERO, &SkinningOptions::default())?;
//! assert!(p.abs_diff_eq(Vec3::Y, 1e-6));
//! # Ok::<(), skeletal_anim::AnimError>(())
//! ```

use glam::{Mat4, Vec3};

use crate::bones::VertexBoneData;
use crate::error::{AnimError, Result};

/// Options for controlling the skinning behavior
#[derive(Debug, Clone)]
pub struct SkinningOptions {
    /// Divide by the total weight so weights need not sum to one
    pub normalize_weights: bool,
    /// Influences below this weight are ignored
    pub weight_threshold: f32,
}

impl Default for SkinningOptions {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            weight_threshold: 0.001,
        }
    }
}

/// Skin a single bind-pose position
///
/// Vertices with no influence above the threshold keep their bind position.
pub fn skin_position(
    matrices: &[Mat4],
    binding: &VertexBoneData,
    position: Vec3,
    options: &SkinningOptions,
) -> Result<Vec3> {
    let mut skinned = Vec3::ZERO;
    let mut total_weight = 0.0f32;

    for (bone, weight) in binding.influences() {
        if weight < options.weight_threshold {
            continue;
        }

        let matrix = matrices
            .get(bone as usize)
            .ok_or(AnimError::InvalidBoneIndex {
                index: bone,
                count: matrices.len(),
            })?;

        skinned += matrix.transform_point3(position) * weight;
        total_weight += weight;
    }

    if total_weight < options.weight_threshold {
        return Ok(position);
    }

    if options.normalize_weights {
        skinned /= total_weight;
    }

    Ok(skinned)
}

/// Skin a batch of positions with their per-vertex bindings
pub fn skin_positions(
    matrices: &[Mat4],
    bindings: &[VertexBoneData],
    positions: &[Vec3],
    options: &SkinningOptions,
) -> Result<Vec<Vec3>> {
    if bindings.len() != positions.len() {
        log::warn!(
            "Skinning {} positions with {} bindings; extra entries are ignored",
            positions.len(),
            bindings.len()
        );
    }

    positions
        .iter()
        .zip(bindings)
        .map(|(&position, binding)| skin_position(matrices, binding, position, options))
        .collect()
}
