//! Bone matrix evaluation
//!
//! Walks the node hierarchy from the root, composing each node's local
//! transform (animated or static) with its parent's global transform, and
//! writes `global_inverse * global * offset` for every node that is a bone.

use glam::Mat4;

use crate::clip::AnimationClip;
use crate::error::{AnimError, Result};
use crate::hierarchy::{Node, ROOT};
use crate::model::SkinnedModel;
use crate::track::LocalTransform;

/// Which nodes the hierarchy walk visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Skip subtrees that contain no bones
    #[default]
    RequiredOnly,
    /// Visit every node
    Full,
}

/// Where node-local transforms come from during a walk
#[derive(Debug, Clone, Copy)]
enum PoseSource<'a> {
    /// Static import transforms only
    Rest,
    Single {
        clip: &'a AnimationClip,
        ticks: f64,
    },
    Blended {
        start: &'a AnimationClip,
        start_ticks: f64,
        end: &'a AnimationClip,
        end_ticks: f64,
        factor: f32,
    },
}

impl PoseSource<'_> {
    fn node_transform(&self, node: &Node, rest: &LocalTransform) -> Result<Mat4> {
        match *self {
            Self::Rest => Ok(*node.transform()),
            Self::Single { clip, ticks } => Ok(match clip.channel(node.name()) {
                Some(channel) => channel.sample(ticks, rest).to_matrix(),
                None => *node.transform(),
            }),
            Self::Blended {
                start,
                start_ticks,
                end,
                end_ticks,
                factor,
            } => match (start.channel(node.name()), end.channel(node.name())) {
                (Some(a), Some(b)) => {
                    let a = a.sample(start_ticks, rest);
                    let b = b.sample(end_ticks, rest);
                    Ok(a.blend(&b, factor).to_matrix())
                }
                (None, None) => Ok(*node.transform()),
                _ => Err(AnimError::UnsupportedBlendConfiguration {
                    node: node.name().to_string(),
                }),
            },
        }
    }
}

impl SkinnedModel {
    /// Evaluate the final bone matrices of clip `clip` at `time_in_seconds`
    ///
    /// `out` is resized to [`num_bones`](Self::num_bones) and element `i`
    /// receives the matrix of bone `i`. Time loops over the clip.
    pub fn bone_transforms(
        &self,
        time_in_seconds: f64,
        clip: usize,
        out: &mut Vec<Mat4>,
    ) -> Result<()> {
        let clip = self.checked_clip(clip)?;
        let ticks = clip.animation_time_ticks(time_in_seconds);
        log::trace!("Evaluating '{}' at tick {:.3}", clip.name(), ticks);

        self.walk(PoseSource::Single { clip, ticks }, out)
    }

    /// Evaluate a blend of two clips at `time_in_seconds`
    ///
    /// Both clips are sampled at the same wall-clock time, each looping over
    /// its own duration. Translation and scale are lerped and rotation is
    /// slerped by `blend_factor`, where 0 yields the start clip and 1 the end
    /// clip. The factor is not clamped.
    ///
    /// Every visited node must be animated by both clips or by neither;
    /// otherwise [`AnimError::UnsupportedBlendConfiguration`] is returned.
    pub fn bone_transforms_blended(
        &self,
        time_in_seconds: f64,
        start_clip: usize,
        end_clip: usize,
        blend_factor: f32,
        out: &mut Vec<Mat4>,
    ) -> Result<()> {
        let start = self.checked_clip(start_clip)?;
        let end = self.checked_clip(end_clip)?;

        self.walk(
            PoseSource::Blended {
                start,
                start_ticks: start.animation_time_ticks(time_in_seconds),
                end,
                end_ticks: end.animation_time_ticks(time_in_seconds),
                factor: blend_factor,
            },
            out,
        )
    }

    /// Bone matrices of the unanimated model
    ///
    /// With offsets that invert the bind pose these are all identity.
    pub fn bind_pose_transforms(&self, out: &mut Vec<Mat4>) -> Result<()> {
        self.walk(PoseSource::Rest, out)
    }

    fn walk(&self, source: PoseSource<'_>, out: &mut Vec<Mat4>) -> Result<()> {
        out.clear();
        out.resize(self.bones.len(), Mat4::IDENTITY);

        let nodes = self.hierarchy.nodes();
        let mut stack = vec![(ROOT, Mat4::IDENTITY)];

        while let Some((index, parent_transform)) = stack.pop() {
            let node = &nodes[index];
            let node_transform = source.node_transform(node, &self.rest_pose[index])?;
            let global = parent_transform * node_transform;

            if let Some(bone) = self.bone_of_node[index] {
                out[bone] = self.global_inverse * global * self.bones.bones()[bone].offset;
            }

            for &child in node.children().iter().rev() {
                if self.traversal == Traversal::Full || self.hierarchy.is_required(child) {
                    stack.push((child, global));
                }
            }
        }

        Ok(())
    }
}
