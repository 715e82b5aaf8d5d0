//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::NodeKey;

/// Collapsible tree navigation: render, toggle and select nodes of a tree document
#[derive(Parser, Debug)]
#[command(name = "treemenu")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Extra config file, layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the visible tree after applying actions
    Show {
        /// Tree data (JSON), `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        data: PathBuf,

        /// Toggle the rendered node with this id (repeatable, applied in order)
        #[arg(short, long, value_name = "ID")]
        toggle: Vec<NodeKey>,

        /// Select the node with this id, opening its ancestors
        #[arg(short, long, value_name = "ID")]
        select: Option<NodeKey>,

        /// Initial selection level, e.g. from the current route
        #[arg(long, value_name = "LEVEL")]
        level: Option<String>,

        /// Initial selection id (used with --level)
        #[arg(long, value_name = "ID", requires = "level")]
        id: Option<NodeKey>,

        /// Print the snapshot as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// List the url of every node in the tree data
    Urls {
        /// Tree data (JSON), `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        data: PathBuf,
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
    /// Print the global config file location
    Path,
}
