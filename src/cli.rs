use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Apex Legends custom tournament scoring")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the scoring API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Create the database schema
    Init {
        /// Drop every table first
        #[arg(long)]
        reset: bool,
    },
    /// Record a match from a telemetry JSON file
    Record {
        /// Custom id
        #[arg(short, long)]
        custom: i64,
        /// Match object or full stats API response
        #[arg(short, long)]
        file: PathBuf,
        /// Match to pick from a multi-match response
        #[arg(short, long)]
        match_id: Option<String>,
    },
    /// Fetch a match from the stats API and record it
    Ingest {
        #[arg(short, long)]
        custom: i64,
        #[arg(short, long)]
        match_id: String,
    },
    /// Print standings of a custom
    Standings {
        /// Custom name
        #[arg(short, long)]
        name: String,
        /// Latest match only instead of the cumulative table
        #[arg(short, long)]
        latest: bool,
    },
    /// Print the spreadsheet export of a custom as JSON
    Export {
        #[arg(short, long)]
        custom: i64,
    },
    /// Follow the overlay board of a running server
    Watch {
        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
        /// Custom name
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        latest: bool,
        /// Stop after this many polls
        #[arg(long)]
        max_polls: Option<u32>,
    },
}
