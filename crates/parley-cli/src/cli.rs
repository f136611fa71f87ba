//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Persist multi-turn conversations and chat through a completion provider.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Storage backend for conversations.
    #[arg(long, value_enum, default_value_t = Backend::Sqlite, global = true)]
    pub backend: Backend,

    /// Data directory (defaults to $PARLEY_DATA_DIR, then ~/.parley).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite document store.
    Sqlite,
    /// One JSON file per conversation.
    Fs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a conversation.
    Init {
        /// Conversation id (alphanumerics plus -_.).
        id: String,

        /// Display title; defaults to the id so the first message names it.
        #[arg(long)]
        title: Option<String>,

        /// Provider model identifier.
        #[arg(long)]
        model: Option<String>,

        /// System prompt text. Use @path/to/file.txt to load from a file.
        #[arg(long)]
        system: Option<String>,

        /// Owner identity recorded on the conversation.
        #[arg(long)]
        owner: Option<String>,

        /// Recreate the conversation if it already exists.
        #[arg(long)]
        overwrite: bool,
    },

    /// List conversations, most recently updated first.
    #[command(alias = "ls")]
    List {
        /// Only this owner's conversations.
        #[arg(long)]
        owner: Option<String>,
    },

    /// Interactive chat on an existing conversation.
    Chat {
        /// Conversation id to chat on.
        id: String,
    },

    /// Rename a conversation.
    Rename {
        id: String,
        title: String,
    },

    /// Delete a conversation.
    #[command(alias = "rm")]
    Delete {
        id: String,
    },

    /// Preview a shared conversation read-only.
    Preview {
        id: String,
    },

    /// Copy a shared conversation into a new owner's namespace.
    Claim {
        id: String,

        /// The claiming owner identity.
        #[arg(long)]
        owner: String,
    },

    /// Submit a bug report with optional file attachments.
    Report {
        /// What went wrong.
        #[arg(long)]
        description: String,

        /// Contact email for follow-up.
        #[arg(long)]
        contact: Option<String>,

        /// Submitter identity.
        #[arg(long)]
        submitter: Option<String>,

        /// Files to attach (repeatable).
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },
}
