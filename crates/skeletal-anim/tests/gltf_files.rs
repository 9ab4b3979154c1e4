//! Importing skinned glTF assets
#![cfg(feature = "gltf")]

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use skeletal_anim::glam::{Mat4, Vec3};
use skeletal_anim::{ImportOptions, SkinnedModel, gltf_import};
use tempfile::TempDir;

const FLOAT: u32 = 5126;
const UNSIGNED_SHORT: u32 = 5123;

/// Binary buffer with one buffer view per accessor
#[derive(Default)]
struct GltfBuffer {
    bytes: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl GltfBuffer {
    fn floats(&mut self, values: &[f32], kind: &str, count: usize) -> usize {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(bytes, FLOAT, kind, count)
    }

    fn shorts(&mut self, values: &[u16], kind: &str, count: usize) -> usize {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(bytes, UNSIGNED_SHORT, kind, count)
    }

    fn bounds(&mut self, accessor: usize, min: &[f32], max: &[f32]) {
        self.accessors[accessor]["min"] = json!(min);
        self.accessors[accessor]["max"] = json!(max);
    }

    fn push(&mut self, bytes: Vec<u8>, component_type: u32, kind: &str, count: usize) -> usize {
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": self.bytes.len(),
            "byteLength": bytes.len(),
        }));
        self.bytes.extend(bytes);
        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "count": count,
            "type": kind,
        }));
        self.accessors.len() - 1
    }
}

/// Scene
/// ├── Body  (skinned triangle, not a joint)
/// └── Hip   (joint 0)
///     └── Knee (joint 1, one unit up)
///
/// Clip "kick" slides the knee along +X and back over 1.2504 s, and gives
/// the hip a cubic-spline scale channel whose tangents are deliberately
/// far from the values.
fn write_rig(dir: &TempDir, body_name: Option<&str>, scene_name: &str) -> std::path::PathBuf {
    let mut buffer = GltfBuffer::default();

    let mut inverse_binds = Mat4::IDENTITY.to_cols_array().to_vec();
    inverse_binds.extend(Mat4::from_translation(Vec3::NEG_Y).to_cols_array());
    let inverse_binds = buffer.floats(&inverse_binds, "MAT4", 2);

    let positions = buffer.floats(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0], "VEC3", 3);
    buffer.bounds(positions, &[0.0, 0.0, 0.0], &[0.0, 2.0, 0.0]);
    let joints = buffer.shorts(&[0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0], "VEC4", 3);
    let weights = buffer.floats(
        &[1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        "VEC4",
        3,
    );

    let slide_times = buffer.floats(&[0.0, 0.5, 1.2504], "SCALAR", 3);
    buffer.bounds(slide_times, &[0.0], &[1.2504]);
    let slide_values = buffer.floats(&[0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0], "VEC3", 3);

    let scale_times = buffer.floats(&[0.0, 1.0], "SCALAR", 2);
    buffer.bounds(scale_times, &[0.0], &[1.0]);
    let mut scale_values = Vec::new();
    for _ in 0..2 {
        scale_values.extend([9.0; 3]);
        scale_values.extend([1.0; 3]);
        scale_values.extend([9.0; 3]);
    }
    let scale_values = buffer.floats(&scale_values, "VEC3", 6);

    let mut body = json!({ "mesh": 0, "skin": 0 });
    if let Some(name) = body_name {
        body["name"] = json!(name);
    }

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": scene_name, "nodes": [0, 1] }],
        "nodes": [
            body,
            { "name": "Hip", "children": [2] },
            { "name": "Knee", "translation": [0.0, 1.0, 0.0] },
        ],
        "meshes": [{
            "name": "Leg",
            "primitives": [{
                "attributes": { "POSITION": positions, "JOINTS_0": joints, "WEIGHTS_0": weights },
            }],
        }],
        "skins": [{ "joints": [1, 2], "inverseBindMatrices": inverse_binds }],
        "animations": [{
            "name": "kick",
            "samplers": [
                { "input": slide_times, "output": slide_values, "interpolation": "LINEAR" },
                { "input": scale_times, "output": scale_values, "interpolation": "CUBICSPLINE" },
            ],
            "channels": [
                { "sampler": 0, "target": { "node": 2, "path": "translation" } },
                { "sampler": 1, "target": { "node": 1, "path": "scale" } },
            ],
        }],
        "buffers": [{ "uri": "rig.bin", "byteLength": buffer.bytes.len() }],
        "bufferViews": buffer.views,
        "accessors": buffer.accessors,
    });

    std::fs::write(dir.path().join("rig.bin"), &buffer.bytes).unwrap();
    let path = dir.path().join("rig.gltf");
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}

fn load(body_name: Option<&str>, scene_name: &str) -> SkinnedModel {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let path = write_rig(&dir, body_name, scene_name);
    gltf_import::load(&path, ImportOptions::default()).unwrap()
}

/// Knee bone matrix a quarter second in: halfway along the first slide
fn assert_knee_pose(model: &SkinnedModel) {
    let mut out = Vec::new();
    model.bone_transforms(0.25, 0, &mut out).unwrap();

    assert_eq!(out.len(), 2);
    assert!(out[0].abs_diff_eq(Mat4::IDENTITY, 1e-5), "{:?}", out[0]);
    let expected = Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0));
    assert!(out[1].abs_diff_eq(expected, 1e-5), "{:?}", out[1]);

    let foot = out[1].transform_point3(Vec3::new(0.0, 2.0, 0.0));
    assert!(foot.abs_diff_eq(Vec3::new(0.5, 2.0, 0.0), 1e-5), "{foot:?}");
}

#[test]
fn test_skin_joints_become_bones() {
    let model = load(Some("Body"), "Scene");

    assert_eq!(model.bones().names().collect::<Vec<_>>(), ["Hip", "Knee"]);
    assert!(model.bones().get(0).unwrap().offset.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    let knee_offset = model.bones().get(1).unwrap().offset;
    assert!(knee_offset.abs_diff_eq(Mat4::from_translation(Vec3::NEG_Y), 1e-6));

    let h = model.hierarchy();
    assert_eq!(h.root().name(), "Scene");
    assert!(h.is_required(h.find("Knee").unwrap()));
    assert!(!h.is_required(h.find("Body").unwrap()));
}

#[test]
fn test_vertex_bindings_from_joints_and_weights() {
    let model = load(Some("Body"), "Scene");

    assert_eq!(model.meshes().len(), 1);
    assert_eq!(model.meshes()[0].name, "Leg#0");
    assert_eq!(model.meshes()[0].num_vertices, 3);

    let influences: Vec<Vec<(u32, f32)>> = model
        .vertex_bones()
        .iter()
        .map(|v| v.influences().collect())
        .collect();
    assert_eq!(influences, [vec![(0, 1.0)], vec![(0, 0.5), (1, 0.5)], vec![(1, 1.0)]]);
}

#[test]
fn test_animation_timed_in_milliseconds() {
    let model = load(Some("Body"), "Scene");

    assert_eq!(model.num_clips(), 1);
    let clip = model.clip(0).unwrap();
    assert_eq!(clip.name(), "kick");
    assert_eq!(clip.ticks_per_second(), 1000.0);
    // Last key at 1250.4 ms, rounded up
    assert_eq!(clip.duration(), 1251.0);
    assert_eq!(clip.loop_duration(), 1251.0);

    let slide = clip.channel("Knee").unwrap().positions().unwrap();
    let times: Vec<f64> = slide.keys().iter().map(|k| k.time).collect();
    assert_eq!(times.len(), 3);
    assert!((times[1] - 500.0).abs() < 1e-6);
    assert!((times[2] - 1250.4).abs() < 1e-3);

    assert_knee_pose(&model);
}

#[test]
fn test_cubic_spline_keeps_values_only() {
    let model = load(Some("Body"), "Scene");
    let scales = model.clip(0).unwrap().channel("Hip").unwrap().scales().unwrap();

    let keys: Vec<(f64, Vec3)> = scales.keys().iter().map(|k| (k.time, k.value)).collect();
    assert_eq!(keys, [(0.0, Vec3::ONE), (1000.0, Vec3::ONE)]);
}

#[test]
fn test_repeated_node_names_are_made_unique() {
    // The mesh node takes "Knee" first, so the joint is renamed
    let model = load(Some("Knee"), "Scene");

    assert_eq!(model.bones().names().collect::<Vec<_>>(), ["Hip", "Knee_2"]);
    let h = model.hierarchy();
    assert!(!h.is_required(h.find("Knee").unwrap()));
    assert!(h.is_required(h.find("Knee_2").unwrap()));
    assert!(model.clip(0).unwrap().channel("Knee_2").is_some());

    assert_knee_pose(&model);
}

#[test]
fn test_node_named_like_the_scene() {
    let model = load(None, "Hip");

    let h = model.hierarchy();
    assert_eq!(h.root().name(), "Hip");
    assert!(h.find("node_0").is_some());
    assert_eq!(model.bones().names().collect::<Vec<_>>(), ["Hip_1", "Knee"]);

    assert_knee_pose(&model);
}
