use crate::client::CompletionBackend;
use crate::config::Config;
use crate::ics::ARTIFACT_FILE_NAME;
use crate::pipeline;
use anyhow::Result;
use rustyline::DefaultEditor;
use std::sync::Arc;

pub struct Application {
    config: Config,
    backend: Arc<dyn CompletionBackend>,
}

impl Application {
    pub fn new(config: Config, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { config, backend }
    }

    pub async fn run(&self) -> Result<()> {
        log::info!("Starting SmartCal terminal");

        let mut rl = DefaultEditor::new()?;

        println!("Welcome to SmartCal! Paste a notice and get a calendar file back.");
        println!("Example: 本周五下午3点在主楼203开年级大会，记得带笔。");
        let prompt = "📅 ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    let notice = line.trim();
                    if notice.is_empty() {
                        continue;
                    }
                    if notice == "exit" || notice == "quit" {
                        break;
                    }
                    if let Err(err) = self.process_notice(notice).await {
                        log::error!("Failed to process notice: {:?}", err);
                        println!("Error: {:#}", err);
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn process_notice(&self, notice: &str) -> Result<()> {
        println!("Analyzing the notice...");
        let output = pipeline::run(self.backend.as_ref(), &self.config, notice).await?;

        let event = &output.event;
        println!("Title:       {}", event.name);
        match &event.begin {
            Some(begin) => println!("Start:       {}", begin),
            None => println!("Start:       unknown"),
        }
        if let Some(end) = &event.end {
            println!("End:         {}", end);
        }
        if !event.location.is_empty() {
            println!("Location:    {}", event.location);
        }
        println!("Description: {}", event.description.replace('\n', " / "));

        std::fs::write(ARTIFACT_FILE_NAME, output.ics.as_bytes())?;
        println!("Calendar file written to ./{}", ARTIFACT_FILE_NAME);

        Ok(())
    }
}
