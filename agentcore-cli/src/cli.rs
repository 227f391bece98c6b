//! CLI parser.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentcore")]
#[command(about = "Agent memory CLI: chat, remember, recall, list, stats, seed", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat. Type `stats`, `reset`, `/remember <text>`, or `quit`.
    Chat {
        /// Seed file inserted when the long-term store is empty.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Insert one memory into the long-term store.
    Remember {
        content: String,
        #[arg(short, long, default_value = "fact")]
        category: String,
        #[arg(short, long, default_value = "5")]
        importance: i32,
    },
    /// Nearest long-term memories to a query.
    Recall {
        query: String,
        #[arg(short, default_value = "3")]
        k: usize,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Newest long-term memories.
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Memory counters as JSON.
    Stats,
    /// Insert every memory in a JSON seed file.
    Seed { file: PathBuf },
}
