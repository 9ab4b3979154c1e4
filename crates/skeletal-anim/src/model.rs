//! Skinned model assembly
//!
//! [`ModelBuilder`] takes what a model importer produces (node hierarchy,
//! sub-meshes with their bones and vertex weights, animation clips) and
//! assembles an immutable [`SkinnedModel`]. Bone indices are assigned in
//! first-seen order across meshes, and the nodes needed to reach every bone
//! are flagged as required.

use std::collections::HashSet;

use glam::Mat4;

use crate::bones::{BoneDataResult, BoneTable, VertexBoneData};
use crate::clip::AnimationClip;
use crate::error::{AnimError, Result};
use crate::evaluator::Traversal;
use crate::hierarchy::NodeHierarchy;
use crate::track::LocalTransform;

/// Default size of the bone matrix palette in the skinning shader
pub const DEFAULT_MAX_BONES: usize = 200;

/// Options for model import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Maximum number of distinct bones in a model
    pub max_bones: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_bones: DEFAULT_MAX_BONES,
        }
    }
}

/// Influence of one bone on one vertex of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexWeight {
    /// Vertex index local to the mesh
    pub vertex: u32,
    pub weight: f32,
}

/// A bone as referenced by one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBone {
    pub name: String,
    /// Inverse bind-pose matrix
    pub offset: Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Import-time description of one sub-mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub name: String,
    pub vertex_count: u32,
    pub bones: Vec<MeshBone>,
}

/// Location of a sub-mesh in the model-wide vertex arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshEntry {
    pub name: String,
    pub base_vertex: u32,
    pub num_vertices: u32,
}

/// Builder for [`SkinnedModel`]
#[derive(Debug)]
pub struct ModelBuilder {
    hierarchy: NodeHierarchy,
    bones: BoneTable,
    vertex_bones: Vec<VertexBoneData>,
    meshes: Vec<MeshEntry>,
    clips: Vec<AnimationClip>,
    options: ImportOptions,
}

impl ModelBuilder {
    pub fn new(hierarchy: NodeHierarchy) -> Self {
        Self {
            hierarchy,
            bones: BoneTable::new(),
            vertex_bones: Vec::new(),
            meshes: Vec::new(),
            clips: Vec::new(),
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a sub-mesh and return its index
    ///
    /// Each bone of the mesh gets a stable index (reused if an earlier mesh
    /// already referenced the same name), its weights are recorded on the
    /// model-wide vertex bindings, and the bone plus its ancestors are
    /// marked as required nodes.
    ///
    /// The mesh is checked in full before anything is recorded, so a
    /// rejected mesh leaves the builder unchanged.
    pub fn add_mesh(&mut self, mesh: &MeshData) -> Result<usize> {
        self.validate_mesh(mesh)?;

        let base_vertex = self.vertex_bones.len() as u32;
        self.vertex_bones.resize(
            self.vertex_bones.len() + mesh.vertex_count as usize,
            VertexBoneData::default(),
        );

        let mut dropped = 0usize;

        for bone in &mesh.bones {
            let bone_id = self.bones.bone_id(&bone.name, bone.offset);

            for w in &bone.weights {
                let global = (base_vertex + w.vertex) as usize;
                if self.vertex_bones[global].add_bone_data(bone_id as u32, w.weight)
                    == BoneDataResult::Full
                {
                    dropped += 1;
                }
            }

            self.hierarchy.mark_required(&bone.name)?;
        }

        if dropped > 0 {
            log::warn!(
                "Mesh '{}': dropped {} bone influences beyond {} per vertex",
                mesh.name,
                dropped,
                crate::bones::MAX_NUM_BONES_PER_VERTEX
            );
        }

        log::debug!(
            "Loaded mesh '{}': {} vertices, {} bones (model total {})",
            mesh.name,
            mesh.vertex_count,
            mesh.bones.len(),
            self.bones.len()
        );

        self.meshes.push(MeshEntry {
            name: mesh.name.clone(),
            base_vertex,
            num_vertices: mesh.vertex_count,
        });

        Ok(self.meshes.len() - 1)
    }

    /// Reject a mesh that would exceed the bone limit, bind vertices outside
    /// its range, or name a bone missing from the hierarchy
    fn validate_mesh(&self, mesh: &MeshData) -> Result<()> {
        let mut new_bones = HashSet::new();

        for bone in &mesh.bones {
            if self.bones.index_of(&bone.name).is_none() {
                new_bones.insert(bone.name.as_str());
                let count = self.bones.len() + new_bones.len();
                if count > self.options.max_bones {
                    return Err(AnimError::TooManyBones {
                        count,
                        max: self.options.max_bones,
                    });
                }
            }

            if let Some(w) = bone.weights.iter().find(|w| w.vertex >= mesh.vertex_count) {
                return Err(AnimError::InvalidVertex {
                    mesh: mesh.name.clone(),
                    vertex: w.vertex,
                    count: mesh.vertex_count,
                });
            }

            if self.hierarchy.find(&bone.name).is_none() {
                return Err(AnimError::MissingNode {
                    name: bone.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Add an animation clip and return its index
    pub fn add_clip(&mut self, clip: AnimationClip) -> usize {
        self.clips.push(clip);
        self.clips.len() - 1
    }

    pub fn hierarchy(&self) -> &NodeHierarchy {
        &self.hierarchy
    }

    /// Finish the model
    pub fn build(self) -> Result<SkinnedModel> {
        if !self.clips.is_empty() && self.bones.is_empty() {
            return Err(AnimError::AnimationsWithoutBones);
        }

        let global_inverse = self.hierarchy.root().transform().inverse();

        let rest_pose = self
            .hierarchy
            .nodes()
            .iter()
            .map(|node| LocalTransform::from_matrix(node.transform()))
            .collect();

        let bone_of_node = self
            .hierarchy
            .nodes()
            .iter()
            .map(|node| self.bones.index_of(node.name()))
            .collect();

        log::debug!(
            "Built model: {} nodes ({} required), {} bones, {} clips, {} vertices",
            self.hierarchy.len(),
            self.hierarchy.required_count(),
            self.bones.len(),
            self.clips.len(),
            self.vertex_bones.len()
        );

        Ok(SkinnedModel {
            hierarchy: self.hierarchy,
            rest_pose,
            bones: self.bones,
            bone_of_node,
            vertex_bones: self.vertex_bones,
            meshes: self.meshes,
            clips: self.clips,
            global_inverse,
            traversal: Traversal::default(),
        })
    }
}

/// An imported model ready for animation evaluation
///
/// The model is immutable; evaluation writes into a caller-owned buffer,
/// so one model can be shared across threads.
#[derive(Debug, Clone)]
pub struct SkinnedModel {
    pub(crate) hierarchy: NodeHierarchy,
    /// Decomposed static transform of each node
    pub(crate) rest_pose: Vec<LocalTransform>,
    pub(crate) bones: BoneTable,
    /// Bone index of each node, if the node is a bone
    pub(crate) bone_of_node: Vec<Option<usize>>,
    pub(crate) vertex_bones: Vec<VertexBoneData>,
    pub(crate) meshes: Vec<MeshEntry>,
    pub(crate) clips: Vec<AnimationClip>,
    /// Inverse of the root node's import transform
    pub(crate) global_inverse: Mat4,
    pub(crate) traversal: Traversal,
}

impl SkinnedModel {
    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    pub fn num_clips(&self) -> usize {
        self.clips.len()
    }

    /// True when the model has animation clips
    pub fn is_animated(&self) -> bool {
        !self.clips.is_empty()
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    /// Index of the first clip called `name`
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name() == name)
    }

    pub fn hierarchy(&self) -> &NodeHierarchy {
        &self.hierarchy
    }

    pub fn bones(&self) -> &BoneTable {
        &self.bones
    }

    /// Bone index of hierarchy node `node`, if it is a bone
    pub fn bone_of_node(&self, node: usize) -> Option<usize> {
        self.bone_of_node.get(node).copied().flatten()
    }

    /// Per-vertex bone bindings across all meshes
    pub fn vertex_bones(&self) -> &[VertexBoneData] {
        &self.vertex_bones
    }

    pub fn meshes(&self) -> &[MeshEntry] {
        &self.meshes
    }

    pub fn global_inverse_transform(&self) -> &Mat4 {
        &self.global_inverse
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Choose whether evaluation skips subtrees without bones
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    pub(crate) fn checked_clip(&self, index: usize) -> Result<&AnimationClip> {
        self.clips.get(index).ok_or(AnimError::InvalidClipIndex {
            index,
            count: self.clips.len(),
        })
    }
}
