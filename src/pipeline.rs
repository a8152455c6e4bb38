//! The extraction pipeline: prompt, completion, recovery, normalization,
//! serialization. Strictly sequential; every user action is one isolated run
//! with no state carried between invocations.

use crate::client::CompletionBackend;
use crate::config::Config;
use crate::event::{self, CalendarEvent, ExtractedEvent};
use crate::ics;
use crate::prompt;
use crate::recover;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

/// Everything one run produces: the recovered fields, the normalized event
/// and the serialized artifact ready for download.
#[derive(Debug)]
pub struct PipelineOutput {
    pub extracted: ExtractedEvent,
    pub event: CalendarEvent,
    pub ics: String,
}

/// Run the full pipeline over one block of notice text.
pub async fn run(
    backend: &dyn CompletionBackend,
    config: &Config,
    text: &str,
) -> Result<PipelineOutput> {
    let text = text.trim();
    if text.is_empty() {
        return Err(anyhow!("No notice text provided"));
    }

    let tz = event::source_timezone(&config.event)?;
    let now = Utc::now().with_timezone(&tz);

    let system_prompt = prompt::build_system_prompt(&now);
    let completion = backend
        .complete(&system_prompt, text)
        .await
        .context("Extraction request failed")?;
    debug!("Completion text: {}", completion);

    let extracted = recover::recover_event(&completion)
        .context("Could not recover an event from the model output")?;
    info!("Extracted event: {:?}", extracted.title);

    let event = event::normalize(extracted.clone(), &config.event, tz);
    let ics = ics::serialize_event(&event, &Uuid::new_v4().to_string(), Utc::now());

    Ok(PipelineOutput { extracted, event, ics })
}
