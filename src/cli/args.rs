//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Mindmap editor: build, edit and inspect mindmaps stored as JSON
#[derive(Parser, Debug)]
#[command(name = "jphmind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .jphmind.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Mindmap file argument; defaults to `<data_dir>/mindmap_<today>.json`.
#[derive(Args, Debug, Clone, Default)]
pub struct FileArg {
    /// Mindmap file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

/// Optional attributes of a node being created.
#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Node color, e.g. "#3498db"
    #[arg(long)]
    pub color: Option<String>,

    /// Node font size
    #[arg(long)]
    pub font_size: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a mindmap with a lone root
    New {
        #[command(flatten)]
        file: FileArg,

        /// Root label (default: configured root_label)
        #[arg(short, long)]
        label: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Write the demonstration mindmap
    Sample {
        #[command(flatten)]
        file: FileArg,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print a mindmap as a tree
    Show {
        #[command(flatten)]
        file: FileArg,

        /// Print node ids next to labels
        #[arg(short, long)]
        ids: bool,

        /// Print the JSON document instead of the tree
        #[arg(long)]
        json: bool,
    },

    /// Append a child under a node
    AddChild {
        #[command(flatten)]
        file: FileArg,

        /// Parent node id
        parent: String,

        /// Label (blank: configured child_label)
        #[arg(default_value = "")]
        label: String,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Append a sibling next to a node
    AddSibling {
        #[command(flatten)]
        file: FileArg,

        /// Node id whose parent receives the sibling
        node: String,

        /// Label (blank: configured sibling_label)
        #[arg(default_value = "")]
        label: String,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Delete a node and its subtree
    Delete {
        #[command(flatten)]
        file: FileArg,

        /// Node id
        node: String,
    },

    /// Change a node's label
    Rename {
        #[command(flatten)]
        file: FileArg,

        /// Node id
        node: String,

        /// New label
        label: String,
    },

    /// Set or clear a node's color
    Recolor {
        #[command(flatten)]
        file: FileArg,

        /// Node id
        node: String,

        /// New color; omit to fall back to the default
        color: Option<String>,
    },

    /// Set a node's font size
    FontSize {
        #[command(flatten)]
        file: FileArg,

        /// Node id
        node: String,

        /// Font size (positive)
        size: u32,
    },

    /// Print node count, depth and leaves
    Stats {
        #[command(flatten)]
        file: FileArg,
    },

    /// Interactive editing session with undo/redo
    Session {
        #[command(flatten)]
        file: FileArg,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}
