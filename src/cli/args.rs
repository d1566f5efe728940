//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

/// Treemap engine: lay out weighted trees, hit-test points, replay interactions
#[derive(Parser, Debug)]
#[command(name = "rstreemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Seed for reproducible node colors
    #[arg(long, global = true, env = "RSTREEMAP_SEED")]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Kind of data behind a source path.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Directory or file on disk, weighted by file size
    #[default]
    Fs,
    /// TOML dataset of nested named records
    Dataset,
}

/// Where the tree comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory (or dataset file with --kind dataset)
    #[arg(value_hint = ValueHint::AnyPath)]
    pub source: PathBuf,

    /// How to read the source
    #[arg(short, long, value_enum, default_value_t = SourceKind::Fs)]
    pub kind: SourceKind,
}

/// Display size overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct AreaArgs {
    /// Display width (default from config)
    #[arg(long)]
    pub width: Option<i64>,

    /// Display height including the status line (default from config)
    #[arg(long)]
    pub height: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the weighted hierarchy as tree
    Tree {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the treemap rectangles, one per visible leaf
    Layout {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        area: AreaArgs,
    },

    /// Show the leaf under a point
    Hit {
        #[command(flatten)]
        source: SourceArgs,
        /// X coordinate
        #[arg(allow_negative_numbers = true)]
        x: i64,
        /// Y coordinate
        #[arg(allow_negative_numbers = true)]
        y: i64,
        #[command(flatten)]
        area: AreaArgs,
    },

    /// Replay clicks and key presses from a script
    Replay {
        #[command(flatten)]
        source: SourceArgs,
        /// Event script (default: stdin)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        script: Option<PathBuf>,
        #[command(flatten)]
        area: AreaArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show global config file location
    Path,
}
