pub mod api_server;
pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod event;
pub mod ics;
pub mod pipeline;
pub mod prompt;
pub mod recover;

use anyhow::Result;
use log::*;
use std::sync::Arc;

// Re-export commonly used types
pub use config::Config;
pub use event::{CalendarEvent, EventTime, ExtractedEvent};
pub use pipeline::PipelineOutput;

/// Run the interactive terminal over an already-constructed configuration
/// and backend.
pub async fn run(config: Config, backend: Arc<dyn client::CompletionBackend>) -> Result<()> {
    let application = app::Application::new(config, backend);
    info!("Initializing SmartCal application");
    application.run().await
}
