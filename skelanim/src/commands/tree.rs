//! `skelanim tree`

use std::path::Path;

use anyhow::Result;
use skeletal_anim::SkinnedModel;
use skeletal_anim::hierarchy::ROOT;

use super::{LoadOptions, load_model};
use crate::utils::{NodeType, TreeNode, TreeOptions, format_vec3, render_tree};

pub fn execute(
    path: &Path,
    depth: Option<usize>,
    no_color: bool,
    all: bool,
    compact: bool,
    options: &LoadOptions,
) -> Result<()> {
    let model = load_model(path, options)?;
    let root = build_tree(&model, ROOT, all);

    let tree_options = TreeOptions {
        max_depth: depth,
        no_color,
        show_metadata: true,
        compact,
    };

    print!("{}", render_tree(&root, &tree_options));
    Ok(())
}

/// Build the display tree below `index`; unrequired nodes are skipped
/// unless `all` is set
fn build_tree(model: &SkinnedModel, index: usize, all: bool) -> TreeNode {
    let hierarchy = model.hierarchy();
    let node = &hierarchy.nodes()[index];

    let bone = model.bone_of_node(index);
    let node_type = if index == ROOT {
        NodeType::Root
    } else if bone.is_some() {
        NodeType::Bone
    } else if hierarchy.is_required(index) {
        NodeType::Joint
    } else {
        NodeType::Node
    };

    let mut tree = TreeNode::new(node.name(), node_type);

    if let Some(bone) = bone {
        tree = tree.with_metadata("bone", bone.to_string());
    }

    let (_, _, translation) = node.transform().to_scale_rotation_translation();
    if translation != skeletal_anim::glam::Vec3::ZERO {
        tree = tree.with_metadata("translation", format_vec3(translation));
    }

    let animated_by: Vec<&str> = model
        .clips()
        .iter()
        .filter(|clip| clip.channel(node.name()).is_some())
        .map(|clip| clip.name())
        .collect();
    if !animated_by.is_empty() {
        tree = tree.with_metadata("animated", animated_by.join(", "));
    }

    for &child in node.children() {
        if all || hierarchy.is_required(child) {
            tree = tree.add_child(build_tree(model, child, all));
        }
    }

    tree
}
