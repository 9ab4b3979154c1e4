//! Serde scene description
//!
//! A plain-data description of a skinned model: a node tree, meshes with
//! their bones and vertex weights, and animation clips. It can be written
//! by hand or exported by tools as JSON or YAML, then turned into a
//! [`SkinnedModel`] with [`SceneDescription::into_model`].
//!
//! ```yaml
//! root:
//!   name: Root
//!   children:
//!     - name: Arm
//!       transform: { translation: [0, 1, 0] }
//! meshes:
//!   - name: body
//!     vertex_count: 1
//!     bones:
//!       - name: Arm
//!         weights: [{ vertex: 0, weight: 1.0 }]
//! animations:
//!   - name: wave
//!     duration: 10
//!     ticks_per_second: 5
//!     channels:
//!       - node: Arm
//!         rotations:
//!           - { time: 0, value: [0, 0, 0, 1] }
//!           - { time: 10, value: [0, 0, 0.7071068, 0.7071068] }
//! ```
//!
//! Vectors are `[x, y, z]` and quaternions `[x, y, z, w]`. A node
//! transform is either a 16-element column-major matrix or a map with
//! optional `translation`, `rotation` and `scale`.

use std::fs;
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::clip::AnimationClip;
use crate::error::{AnimError, Result};
use crate::hierarchy::NodeHierarchy;
use crate::model::{ImportOptions, MeshBone, MeshData, ModelBuilder, SkinnedModel, VertexWeight};
use crate::track::{Keyframe, KeyframeTrack, NodeAnimation};

/// Local transform of a node or a bone offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeTransform {
    /// Column-major 4x4 matrix
    Matrix([f32; 16]),
    Trs(Trs),
}

/// Translation, rotation and scale composed as `T * R * S`
///
/// Unknown keys are rejected so a misspelled component is an error rather
/// than a silent identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trs {
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::Trs(Trs::default())
    }
}

impl NodeTransform {
    pub fn to_matrix(&self) -> Mat4 {
        match self {
            Self::Matrix(cols) => Mat4::from_cols_array(cols),
            Self::Trs(trs) => {
                Mat4::from_scale_rotation_translation(trs.scale, trs.rotation, trs.translation)
            }
        }
    }
}

/// A node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub transform: NodeTransform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

/// A bone referenced by a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDescription {
    /// Name of the hierarchy node driving this bone
    pub name: String,
    /// Inverse bind-pose matrix
    #[serde(default)]
    pub offset: NodeTransform,
    #[serde(default)]
    pub weights: Vec<VertexWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescription {
    pub name: String,
    pub vertex_count: u32,
    #[serde(default)]
    pub bones: Vec<BoneDescription>,
}

/// Keyframes for one animated node; empty lists mean "not animated"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescription {
    pub node: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<Keyframe<Vec3>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rotations: Vec<Keyframe<Quat>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scales: Vec<Keyframe<Vec3>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescription {
    pub name: String,
    /// Duration in ticks
    pub duration: f64,
    /// Tick rate; 0 selects the default of 25
    #[serde(default)]
    pub ticks_per_second: f64,
    #[serde(default)]
    pub channels: Vec<ChannelDescription>,
}

/// A complete skinned model description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub root: SceneNode,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
    #[serde(default)]
    pub animations: Vec<ClipDescription>,
}

impl SceneDescription {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| AnimError::Parse(e.to_string()))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml_ng::from_str(s).map_err(|e| AnimError::Parse(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnimError::Parse(e.to_string()))
    }

    /// Load a description, choosing the parser from the file extension
    /// (`.json`, `.yaml` or `.yml`)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let text = fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Self::from_json_str(&text),
            "yaml" | "yml" => Self::from_yaml_str(&text),
            _ => Err(AnimError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Build the model this description stands for
    pub fn into_model(self, options: ImportOptions) -> Result<SkinnedModel> {
        let mut hierarchy = NodeHierarchy::new(self.root.name, self.root.transform.to_matrix());

        let mut stack: Vec<(usize, SceneNode)> = self
            .root
            .children
            .into_iter()
            .rev()
            .map(|child| (crate::hierarchy::ROOT, child))
            .collect();

        while let Some((parent, node)) = stack.pop() {
            let index = hierarchy.add_child(parent, node.name, node.transform.to_matrix())?;
            stack.extend(node.children.into_iter().rev().map(|child| (index, child)));
        }

        let mut builder = ModelBuilder::new(hierarchy).with_options(options);

        for mesh in self.meshes {
            builder.add_mesh(&MeshData {
                name: mesh.name,
                vertex_count: mesh.vertex_count,
                bones: mesh
                    .bones
                    .into_iter()
                    .map(|bone| MeshBone {
                        name: bone.name,
                        offset: bone.offset.to_matrix(),
                        weights: bone.weights,
                    })
                    .collect(),
            })?;
        }

        for clip in self.animations {
            let channels = clip
                .channels
                .into_iter()
                .map(ChannelDescription::into_node_animation)
                .collect::<Result<Vec<_>>>()?;
            builder.add_clip(AnimationClip::new(
                clip.name,
                clip.duration,
                clip.ticks_per_second,
                channels,
            ));
        }

        builder.build()
    }
}

impl ChannelDescription {
    fn into_node_animation(self) -> Result<NodeAnimation> {
        let mut channel = NodeAnimation::new(self.node);
        if !self.positions.is_empty() {
            channel = channel.with_positions(KeyframeTrack::new(self.positions)?);
        }
        if !self.rotations.is_empty() {
            channel = channel.with_rotations(KeyframeTrack::new(self.rotations)?);
        }
        if !self.scales.is_empty() {
            channel = channel.with_scales(KeyframeTrack::new(self.scales)?);
        }
        Ok(channel)
    }
}
