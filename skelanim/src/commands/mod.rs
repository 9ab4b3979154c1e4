//! Command implementations

pub mod info;
pub mod pose;
pub mod tree;

use std::path::Path;

use anyhow::{Context, Result, bail};
use skeletal_anim::{ImportOptions, SceneDescription, SkinnedModel};

/// Options shared by every command that loads a scene
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub max_bones: usize,
}

impl LoadOptions {
    fn import_options(&self) -> ImportOptions {
        ImportOptions {
            max_bones: self.max_bones,
        }
    }
}

/// Load a scene file as a model, picking the importer from the extension
pub fn load_model(path: &Path, options: &LoadOptions) -> Result<SkinnedModel> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    log::info!("Loading scene: {}", path.display());

    let model = match extension.as_str() {
        "json" | "yaml" | "yml" => SceneDescription::load(path)
            .with_context(|| format!("Failed to read scene from {}", path.display()))?
            .into_model(options.import_options())
            .with_context(|| format!("Failed to import scene {}", path.display()))?,
        #[cfg(feature = "gltf")]
        "gltf" | "glb" => skeletal_anim::gltf_import::load(path, options.import_options())
            .with_context(|| format!("Failed to import glTF asset {}", path.display()))?,
        _ => bail!(
            "Unsupported scene format '{}' (expected .json, .yaml, .yml{})",
            path.display(),
            if cfg!(feature = "gltf") {
                ", .gltf or .glb"
            } else {
                ""
            }
        ),
    };

    log::info!(
        "Loaded {} nodes, {} bones, {} clips",
        model.hierarchy().len(),
        model.num_bones(),
        model.num_clips()
    );

    Ok(model)
}

/// Resolve a clip given as an index or a name
pub fn resolve_clip(model: &SkinnedModel, clip: &str) -> Result<usize> {
    if let Ok(index) = clip.parse::<usize>() {
        if index < model.num_clips() {
            return Ok(index);
        }
        bail!(
            "Clip index {index} is out of range (model has {} clips)",
            model.num_clips()
        );
    }

    model
        .clip_index(clip)
        .with_context(|| format!("No clip named '{clip}'"))
}
