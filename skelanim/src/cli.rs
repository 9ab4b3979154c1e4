//! Root CLI structure for skelanim

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skelanim")]
#[command(about = "Inspect and evaluate skeletal animations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Maximum number of bones a model may have
    #[arg(long, global = true, default_value_t = skeletal_anim::model::DEFAULT_MAX_BONES)]
    pub max_bones: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about a scene
    Info {
        /// Path to the scene file (.json, .yaml, .yml, .gltf, .glb)
        file: PathBuf,

        /// Show per-channel details for every clip
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the node hierarchy as a tree
    Tree {
        /// Path to the scene file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Include nodes that carry no bones
        #[arg(short, long)]
        all: bool,

        /// Show metadata inline
        #[arg(short, long)]
        compact: bool,
    },

    /// Evaluate bone matrices at a point in time
    Pose(PoseArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct PoseArgs {
    /// Path to the scene file
    pub file: PathBuf,

    /// Time in seconds
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub time: f64,

    /// Clip to evaluate, by index or name
    #[arg(short, long, default_value = "0")]
    pub clip: String,

    /// Second clip to blend towards, by index or name
    #[arg(short, long, requires = "factor")]
    pub blend_to: Option<String>,

    /// Blend factor: 0 is the first clip, 1 the second
    #[arg(short, long, requires = "blend_to", allow_negative_numbers = true)]
    pub factor: Option<f32>,

    /// Walk every node instead of only the ones leading to bones
    #[arg(long)]
    pub full: bool,

    /// Print the matrices as JSON
    #[arg(long)]
    pub json: bool,

    /// Evaluate the bind pose instead of a clip
    #[arg(long, conflicts_with_all = ["clip", "blend_to"])]
    pub bind_pose: bool,
}
