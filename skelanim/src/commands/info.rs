//! `skelanim info`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use skeletal_anim::SkinnedModel;

use super::{LoadOptions, load_model};
use crate::utils::{add_table_row, create_table, format_bytes, format_seconds};

pub fn execute(path: &Path, detailed: bool, options: &LoadOptions) -> Result<()> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Failed to stat {}", path.display()))?;
    let model = load_model(path, options)?;

    println!("Scene: {}", path.display());
    println!("File size: {}", format_bytes(metadata.len()));
    println!();

    print_summary(&model);
    print_meshes(&model);
    print_clips(&model, detailed);

    Ok(())
}

fn print_summary(model: &SkinnedModel) {
    let hierarchy = model.hierarchy();
    let influenced = model
        .vertex_bones()
        .iter()
        .filter(|v| v.count() > 0)
        .count();

    println!("=== Model ===");
    println!("Nodes:          {}", hierarchy.len());
    println!("Required nodes: {}", hierarchy.required_count());
    println!("Bones:          {}", model.num_bones());
    println!(
        "Vertices:       {} ({} skinned)",
        model.vertex_bones().len(),
        influenced
    );
    println!("Animated:       {}", if model.is_animated() { "yes" } else { "no" });
}

fn print_meshes(model: &SkinnedModel) {
    if model.meshes().is_empty() {
        return;
    }

    println!("\n=== Meshes ===");
    let mut table = create_table(&["#", "Name", "Base vertex", "Vertices"]);
    for (i, mesh) in model.meshes().iter().enumerate() {
        add_table_row(
            &mut table,
            vec![
                i.to_string(),
                mesh.name.clone(),
                mesh.base_vertex.to_string(),
                mesh.num_vertices.to_string(),
            ],
        );
    }
    table.printstd();
}

fn print_clips(model: &SkinnedModel, detailed: bool) {
    if !model.is_animated() {
        return;
    }

    println!("\n=== Animations ===");
    let mut table = create_table(&["#", "Name", "Ticks", "Ticks/s", "Length", "Channels"]);
    for (i, clip) in model.clips().iter().enumerate() {
        let rate = if clip.declared_ticks_per_second() == 0.0 {
            format!("{} (default)", clip.ticks_per_second())
        } else {
            clip.ticks_per_second().to_string()
        };
        add_table_row(
            &mut table,
            vec![
                i.to_string(),
                clip.name().to_string(),
                clip.duration().to_string(),
                rate,
                format_seconds(clip.duration_seconds()),
                clip.animated_node_count().to_string(),
            ],
        );
    }
    table.printstd();

    if !detailed {
        return;
    }

    for clip in model.clips() {
        println!("\n--- {} ---", clip.name());
        let mut table = create_table(&["Node", "Position keys", "Rotation keys", "Scale keys"]);
        for channel in clip.channels() {
            let keys = |len: Option<usize>| len.map_or_else(|| "-".to_string(), |n| n.to_string());
            add_table_row(
                &mut table,
                vec![
                    channel.node_name().to_string(),
                    keys(channel.positions().map(|t| t.len())),
                    keys(channel.rotations().map(|t| t.len())),
                    keys(channel.scales().map(|t| t.len())),
                ],
            );
        }
        table.printstd();
    }
}
