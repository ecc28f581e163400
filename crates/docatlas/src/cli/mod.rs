//! Command-line interface for docatlas.
//!
//! This module provides the CLI structure for the `docatlas` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckCommand, CompareCommand, ConfigCommand, LinksCommand, ListCommand, OutputFormat,
    ProjectsCommand, ShowCommand, TaggedCommand,
};

/// docatlas - Browse a documentation corpus
///
/// Lists the speeches and project documentation sets of a content tree in
/// reading order and answers lookups against the projects' comparison table.
#[derive(Debug, Parser)]
#[command(name = "docatlas")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content root (overrides `content.root` from the configuration)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List projects with their document counts
    Projects(ProjectsCommand),

    /// List the documents of a project in reading order
    List(ListCommand),

    /// Show one document
    Show(ShowCommand),

    /// Show a document's cross-links
    Links(LinksCommand),

    /// List documents carrying a topic tag
    Tagged(TaggedCommand),

    /// Look up the comparison table
    Compare(CompareCommand),

    /// Load the content and report problems
    Check(CheckCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
