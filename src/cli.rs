use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SmartCal - turn free-text notices into calendar events with AI extraction
#[derive(Debug, Parser)]
#[command(name = "smartcal")]
#[command(about = "Turn free-text notices into downloadable calendar events", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive terminal mode)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Start in API server mode only
    #[arg(long = "api-server", conflicts_with = "full")]
    pub api_server: bool,

    /// Start both terminal and API server
    #[arg(long = "full", conflicts_with = "api_server")]
    pub full: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract one notice and write the calendar file
    Extract {
        /// The notice text to extract an event from
        #[arg(required = true)]
        text: String,

        /// Where to write the .ics artifact (defaults to ./smartcal_event.ics)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the recovered fields as JSON instead of the field summary
        #[arg(long)]
        json: bool,
    },
}
