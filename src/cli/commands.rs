//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "scrubmate")]
#[command(about = "ScrubMate: operating-room question answering over a curated knowledge base")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: [server].host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: [server].port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Ask a question and print the summarized answer
    Ask {
        /// The question
        question: String,
        /// Print the matched answer as stored, without calling the LLM
        #[arg(long)]
        raw: bool,
    },
    /// Show how a question matches the knowledge base
    Match {
        /// The question
        question: String,
        /// Override the acceptance threshold (0-100)
        #[arg(short, long)]
        threshold: Option<f64>,
    },
    /// Show the synonym variants a query expands to
    Expand {
        /// The query
        query: String,
    },
    /// Append a question/answer record to the input sheet
    Add {
        /// Question; several comma-separated questions share the answer
        #[arg(short, long)]
        question: String,
        /// Answer text
        #[arg(short, long)]
        answer: String,
        /// Image filename under the images directory
        #[arg(long)]
        image: Option<String>,
        /// Surgeon
        #[arg(long, default_value = "")]
        surgeon: String,
        /// Operating room number
        #[arg(long, default_value = "")]
        room: String,
        /// Surgery name
        #[arg(long, default_value = "")]
        surgery: String,
        /// Surgical devices, comma separated
        #[arg(long, default_value = "")]
        devices: String,
        /// Surgical tools, comma separated
        #[arg(long, default_value = "")]
        tools: String,
    },
    /// List knowledge base questions
    List {
        /// Maximum number of rows to print
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// List the input sheet records with their metadata instead
        #[arg(long)]
        input: bool,
    },
    /// Show current configuration
    Config,
}
