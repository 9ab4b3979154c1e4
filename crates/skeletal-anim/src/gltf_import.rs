//! glTF 2.0 importer
//!
//! Converts the default scene of a `.gltf`/`.glb` asset into a
//! [`SkinnedModel`]:
//!
//! - the scene's root nodes hang below a synthetic identity root named
//!   after the scene (or `RootNode`); unnamed nodes become `node_<index>`
//!   and repeated names get the node index appended
//! - every mesh primitive becomes one mesh; skinned primitives take their
//!   bones from the node's skin and weights from `JOINTS_0`/`WEIGHTS_0`
//! - every animation becomes a clip timed in milliseconds
//!   (`ticks_per_second = 1000`)

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;

use crate::clip::AnimationClip;
use crate::error::Result;
use crate::hierarchy::{NodeHierarchy, ROOT};
use crate::model::{ImportOptions, MeshBone, MeshData, ModelBuilder, SkinnedModel, VertexWeight};
use crate::track::{Keyframe, KeyframeTrack, NodeAnimation};

/// Clip tick rate used for glTF animations
pub const GLTF_TICKS_PER_SECOND: f64 = 1000.0;

const DEFAULT_ROOT_NAME: &str = "RootNode";

/// Load a glTF asset as a skinned model
pub fn load<P: AsRef<Path>>(path: P, options: ImportOptions) -> Result<SkinnedModel> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)?;

    let Some(scene) = document
        .default_scene()
        .or_else(|| document.scenes().next())
    else {
        log::warn!("{} has no scenes", path.display());
        return ModelBuilder::new(NodeHierarchy::new(DEFAULT_ROOT_NAME, Mat4::IDENTITY))
            .with_options(options)
            .build();
    };

    let root_name = scene.name().unwrap_or(DEFAULT_ROOT_NAME);
    let names = unique_node_names(&document, root_name);

    let mut hierarchy = NodeHierarchy::new(root_name, Mat4::IDENTITY);
    let mut mesh_nodes = Vec::new();

    let mut stack: Vec<(usize, gltf::Node<'_>)> =
        scene.nodes().map(|node| (ROOT, node)).collect();
    stack.reverse();

    while let Some((parent, node)) = stack.pop() {
        let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
        let index = hierarchy.add_child(parent, names[node.index()].clone(), transform)?;

        if node.mesh().is_some() {
            mesh_nodes.push(node.clone());
        }

        let mut children: Vec<_> = node.children().map(|child| (index, child)).collect();
        children.reverse();
        stack.extend(children);
    }

    let mut builder = ModelBuilder::new(hierarchy).with_options(options);

    for node in &mesh_nodes {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let mesh_name = mesh
            .name()
            .map_or_else(|| format!("mesh_{}", mesh.index()), str::to_string);

        for primitive in mesh.primitives() {
            let data = read_primitive(&buffers, &names, node, &primitive, &mesh_name);
            builder.add_mesh(&data)?;
        }
    }

    for animation in document.animations() {
        builder.add_clip(read_animation(&buffers, &names, &animation)?);
    }

    builder.build()
}

/// Hierarchy name of every node, by node index
///
/// glTF names are optional and need not be unique. A name already taken
/// (by the root, an earlier node, or a generated `node_<index>`) gets the
/// node index appended until it is free.
fn unique_node_names(document: &gltf::Document, root_name: &str) -> Vec<String> {
    let mut taken = HashSet::from([root_name.to_string()]);

    document
        .nodes()
        .map(|node| {
            let index = node.index();
            let mut name = node
                .name()
                .map_or_else(|| format!("node_{index}"), str::to_string);
            while taken.contains(&name) {
                name = format!("{name}_{index}");
            }
            log::trace!("Node {index} named '{name}'");
            taken.insert(name.clone());
            name
        })
        .collect()
}

fn read_primitive(
    buffers: &[gltf::buffer::Data],
    names: &[String],
    node: &gltf::Node<'_>,
    primitive: &gltf::Primitive<'_>,
    mesh_name: &str,
) -> MeshData {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let vertex_count = reader.read_positions().map_or(0, Iterator::count) as u32;
    let name = format!("{mesh_name}#{}", primitive.index());

    let (Some(skin), Some(joints), Some(weights)) =
        (node.skin(), reader.read_joints(0), reader.read_weights(0))
    else {
        return MeshData {
            name,
            vertex_count,
            bones: Vec::new(),
        };
    };

    let skin_reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let inverse_binds: Vec<Mat4> = skin_reader
        .read_inverse_bind_matrices()
        .map(|ibm| ibm.map(|m| Mat4::from_cols_array_2d(&m)).collect())
        .unwrap_or_default();

    let mut bones: Vec<MeshBone> = skin
        .joints()
        .enumerate()
        .map(|(i, joint)| MeshBone {
            name: names[joint.index()].clone(),
            offset: inverse_binds.get(i).copied().unwrap_or(Mat4::IDENTITY),
            weights: Vec::new(),
        })
        .collect();

    let mut bad_joints = 0usize;
    for (vertex, (joint_ids, joint_weights)) in
        joints.into_u16().zip(weights.into_f32()).enumerate()
    {
        for (&joint, &weight) in joint_ids.iter().zip(&joint_weights) {
            if weight == 0.0 {
                continue;
            }
            match bones.get_mut(joint as usize) {
                Some(bone) => bone.weights.push(VertexWeight {
                    vertex: vertex as u32,
                    weight,
                }),
                None => bad_joints += 1,
            }
        }
    }

    if bad_joints > 0 {
        log::warn!("Mesh '{name}': ignored {bad_joints} weights referring to missing joints");
    }

    MeshData {
        name,
        vertex_count,
        bones,
    }
}

/// Keep the value of each cubic-spline triple, dropping the tangents
fn spline_values<T>(values: Vec<T>, interpolation: Interpolation) -> Vec<T> {
    if matches!(interpolation, Interpolation::CubicSpline) {
        values.into_iter().skip(1).step_by(3).collect()
    } else {
        values
    }
}

fn keyframes<T>(times: &[f64], values: Vec<T>) -> Result<KeyframeTrack<T>> {
    KeyframeTrack::new(
        times
            .iter()
            .zip(values)
            .map(|(&time, value)| Keyframe::new(time, value))
            .collect(),
    )
}

fn read_animation(
    buffers: &[gltf::buffer::Data],
    names: &[String],
    animation: &gltf::Animation<'_>,
) -> Result<AnimationClip> {
    let clip_name = animation
        .name()
        .map_or_else(|| format!("animation_{}", animation.index()), str::to_string);

    let mut channels: BTreeMap<usize, NodeAnimation> = BTreeMap::new();
    let mut duration = 0.0f64;

    for channel in animation.channels() {
        let target = channel.target().node().index();
        let interpolation = channel.sampler().interpolation();
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));

        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f64> = inputs
            .map(|t| f64::from(t) * GLTF_TICKS_PER_SECOND)
            .collect();
        if let Some(&last) = times.last() {
            duration = duration.max(last);
        }

        let Some(outputs) = reader.read_outputs() else {
            continue;
        };

        let node_animation = channels
            .remove(&target)
            .unwrap_or_else(|| NodeAnimation::new(names[target].clone()));

        let node_animation = match outputs {
            ReadOutputs::Translations(values) => node_animation.with_positions(keyframes(
                &times,
                spline_values(values.map(Vec3::from_array).collect(), interpolation),
            )?),
            ReadOutputs::Rotations(values) => node_animation.with_rotations(keyframes(
                &times,
                spline_values(
                    values.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                ),
            )?),
            ReadOutputs::Scales(values) => node_animation.with_scales(keyframes(
                &times,
                spline_values(values.map(Vec3::from_array).collect(), interpolation),
            )?),
            ReadOutputs::MorphTargetWeights(_) => {
                log::debug!(
                    "Animation '{clip_name}': skipping morph target weights on '{}'",
                    names[target]
                );
                node_animation
            }
        };

        channels.insert(target, node_animation);
    }

    log::debug!(
        "Loaded animation '{}': {} animated nodes, {:.0} ms",
        clip_name,
        channels.len(),
        duration
    );

    Ok(AnimationClip::new(
        clip_name,
        duration.ceil(),
        GLTF_TICKS_PER_SECOND,
        channels.into_values().collect(),
    ))
}
