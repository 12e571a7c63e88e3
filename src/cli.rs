//! CLI definitions for SmartFill.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SmartFill CLI.
#[derive(Parser)]
#[command(name = "smartfill")]
#[command(about = "Fill web forms from your profile with an AI value resolver")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.smartfill/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scan the page, preview proposed values and fill them
    Fill {
        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Revert the most recent fill on the page
    Undo {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Fill history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Profile management
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Credential management
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },
}

/// Which page to work on.
#[derive(clap::Args)]
pub(crate) struct PageArgs {
    /// Work on a captured page file instead of a live browser tab
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Attach to the first tab whose URL contains this text
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum HistoryAction {
    /// List recorded fills, newest first
    List {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Delete every recorded fill
    Clear,
}

#[derive(Subcommand)]
pub(crate) enum ProfileAction {
    /// Show the stored profile
    Show,

    /// Set one profile attribute
    Set {
        /// Attribute key (e.g. name, email, linkedin)
        key: String,

        /// Attribute value; empty removes the attribute
        value: String,
    },

    /// Merge attributes from a JSON object file
    Import {
        /// Path to a JSON file of string attributes
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub(crate) enum CredentialAction {
    /// Store the Anthropic API key
    Set {
        /// API key
        key: String,
    },
}
