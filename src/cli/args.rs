//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and publish a content tree
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Content directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Config file path (default: tola.toml)
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = "tola.toml",
        value_hint = clap::ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the propagated content tree
    #[command(visible_alias = "t")]
    Tree {
        /// Print JSON instead of an indented listing
        #[arg(short, long)]
        json: bool,
    },

    /// Resolve a page reference
    #[command(visible_alias = "r")]
    Ref {
        /// Reference to resolve (`sect3/b1`, `unique.md`, `/categories/rust`)
        #[arg(value_name = "REF")]
        reference: String,

        /// Resolve relative to the page this reference names
        #[arg(short, long, value_name = "REF")]
        from: Option<String>,
    },

    /// Publish every bundle resource into the output directory
    #[command(visible_alias = "p")]
    Publish,
}
