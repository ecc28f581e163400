//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Projects command arguments.
#[derive(Debug, Args)]
pub struct ProjectsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Project whose documents to list, in reading order
    pub project: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Document identifier, `<project>/<file stem>`
    pub id: String,

    /// Print the document body after its metadata
    #[arg(short, long)]
    pub body: bool,

    /// Output as JSON
    #[arg(short, long, conflicts_with = "body")]
    pub json: bool,
}

/// Links command arguments.
#[derive(Debug, Args)]
pub struct LinksCommand {
    /// Document identifier
    pub id: String,

    /// Show documents linking to this one instead
    #[arg(short, long)]
    pub back: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Tagged command arguments.
#[derive(Debug, Args)]
pub struct TaggedCommand {
    /// Topic tag (case-insensitive)
    pub tag: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Compare command arguments.
#[derive(Debug, Args)]
pub struct CompareCommand {
    /// Attribute row to show (all rows if omitted)
    pub attribute: Option<String>,

    /// Restrict output to one subject column
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
