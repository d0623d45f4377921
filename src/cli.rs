use std::path::PathBuf;

use clap::{Parser, Subcommand};
use todo::codec::Format;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "todo", about = "Command-line task manager")]
pub struct Cli {
    /// Path to the task file
    #[arg(long, env = "TODO_FILE", global = true, default_value = "tasks.json")]
    pub file: PathBuf,

    /// Minimum level of log events printed to stderr
    #[arg(long, env = "TODO_LOG_LEVEL", global = true, default_value = "error")]
    pub log_level: LevelFilter,

    /// Also append debug-level logs to this file
    #[arg(long, env = "TODO_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// How long a save waits for the task file lock, in milliseconds
    #[arg(long, env = "TODO_LOCK_TIMEOUT_MS", global = true, default_value = "5000")]
    pub lock_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// Task description
        description: String,
    },

    /// List tasks
    List {
        /// Which tasks to show
        #[arg(long, default_value = "all", value_parser = ["all", "done", "pending"])]
        filter: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task as completed
    Complete {
        /// Task ID
        id: i64,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },

    /// Export tasks to a JSON or CSV file
    Export {
        /// Export format (json, csv)
        #[arg(long, default_value = "json")]
        format: Format,
        /// Output file; the format's extension is appended if missing
        #[arg(long, default_value = "tasks_export")]
        out: PathBuf,
    },

    /// Replace all tasks with the contents of a JSON or CSV file
    Load {
        /// File to import
        file: PathBuf,
        /// Input format (json, csv) [default: from the file extension]
        #[arg(long)]
        format: Option<Format>,
    },
}
