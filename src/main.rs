use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use smartcal::cli::{Cli, Commands};
use smartcal::client::{ArkClient, CompletionBackend};
use smartcal::config::{Config, Credentials};
use smartcal::{api_server, ics, pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with custom format
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    // A .env file may carry the API key in development
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load()?;

    // Missing credential halts here, before any interaction is possible
    let credentials = Credentials::from_env()?;
    let backend: Arc<dyn CompletionBackend> = Arc::new(ArkClient::new(&config.api, credentials));

    match cli.command {
        Some(Commands::Extract { text, output, json }) => {
            run_extract(&config, backend.as_ref(), &text, output, json).await
        }
        None if cli.api_server => {
            info!("Starting in API server mode");
            api_server::start_api_server(config, backend).await
        }
        None if cli.full => {
            info!("Starting API server on {}", config.server.bind);
            let api_config = config.clone();
            let api_backend = backend.clone();
            let api_handle = tokio::spawn(async move {
                if let Err(e) = api_server::start_api_server(api_config, api_backend).await {
                    log::error!("API server error: {:?}", e);
                }
            });

            let result = smartcal::run(config, backend).await;
            api_handle.abort();
            result
        }
        None => smartcal::run(config, backend).await,
    }
}

async fn run_extract(
    config: &Config,
    backend: &dyn CompletionBackend,
    text: &str,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let result = pipeline::run(backend, config, text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.extracted)?);
    } else {
        let event = &result.event;
        println!("Title:       {}", event.name);
        if let Some(begin) = &event.begin {
            println!("Start:       {}", begin);
        }
        if let Some(end) = &event.end {
            println!("End:         {}", end);
        }
        if !event.location.is_empty() {
            println!("Location:    {}", event.location);
        }
    }

    let path = output.unwrap_or_else(|| PathBuf::from(ics::ARTIFACT_FILE_NAME));
    std::fs::write(&path, result.ics.as_bytes())?;
    info!("Calendar file written to {}", path.display());

    Ok(())
}
