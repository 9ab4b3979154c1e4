//! `skelanim pose`

use anyhow::{Context, Result};
use serde_json::json;
use skeletal_anim::Traversal;
use skeletal_anim::glam::Mat4;

use super::{LoadOptions, load_model, resolve_clip};
use crate::cli::PoseArgs;
use crate::utils::format_matrix_rows;

pub fn execute(args: &PoseArgs, options: &LoadOptions) -> Result<()> {
    let mut model = load_model(&args.file, options)?;
    if args.full {
        model = model.with_traversal(Traversal::Full);
    }

    let mut matrices = Vec::new();
    let description = if args.bind_pose {
        model
            .bind_pose_transforms(&mut matrices)
            .context("Failed to evaluate bind pose")?;
        "bind pose".to_string()
    } else {
        let start = resolve_clip(&model, &args.clip)?;
        let start_name = model.clips()[start].name().to_string();

        match (&args.blend_to, args.factor) {
            (Some(end), Some(factor)) => {
                let end = resolve_clip(&model, end)?;
                model
                    .bone_transforms_blended(args.time, start, end, factor, &mut matrices)
                    .with_context(|| format!("Failed to blend clips {start} and {end}"))?;
                format!(
                    "'{}' -> '{}' at factor {} and {} s",
                    start_name,
                    model.clips()[end].name(),
                    factor,
                    args.time
                )
            }
            _ => {
                model
                    .bone_transforms(args.time, start, &mut matrices)
                    .with_context(|| format!("Failed to evaluate clip {start}"))?;
                format!("'{}' at {} s", start_name, args.time)
            }
        }
    };

    let names: Vec<&str> = model.bones().names().collect();

    if args.json {
        let bones: Vec<_> = matrices
            .iter()
            .zip(&names)
            .enumerate()
            .map(|(index, (matrix, name))| {
                json!({
                    "index": index,
                    "name": name,
                    "matrix": matrix.to_cols_array(),
                })
            })
            .collect();
        let output = json!({
            "pose": description,
            "bones": bones,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Pose: {description}");
        for (index, (matrix, name)) in matrices.iter().zip(&names).enumerate() {
            print_matrix(index, name, matrix);
        }
    }

    Ok(())
}

fn print_matrix(index: usize, name: &str, matrix: &Mat4) {
    println!("\n#{index} {name}");
    for row in format_matrix_rows(matrix) {
        println!("  {row}");
    }
}
