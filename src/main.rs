//! Trip API command line client
//!
//! Drives the trip-planning backend through the resilient client and prints
//! JSON results

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};
use trip_api_client::config::Settings;
use trip_api_client::models::progress::{progress_channel, ProgressEvent};
use trip_api_client::utils::logging::init_logging;
use trip_api_client::{
    ApiClient, ApiClientConfig, ChatRequest, InfoTopic, TripDraft, TripListQuery, TripOrchestrationFlow, TripOutcome,
};

/// `trip-api-client` command arguments.
#[derive(Debug, Parser)]
#[command(name = "trip-api-client", about = "Call the trip-planning backend", version)]
struct Cli {
    /// JSON client configuration. Defaults to the standard locations, then the environment.
    #[arg(long, value_name = "path")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a trip from a draft JSON file
    Generate { draft: PathBuf },
    /// List trips
    Trips {
        #[arg(default_value_t = 1)]
        page: u32,
        #[arg(default_value_t = 10)]
        limit: u32,
    },
    /// Show one trip
    Trip { id: String },
    /// Destination information lookup
    Info {
        topic: InfoTopic,
        destination: String,
        nationality: Option<String>,
    },
    /// Ask the travel assistant
    Chat { message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::new().context("Failed to load settings")?;
    init_logging(&settings.logging)?;

    let file_config = match &cli.config {
        Some(path) => Some(ApiClientConfig::load(path)?),
        None => ApiClientConfig::load_default().context("Failed to load client configuration")?,
    };
    if let Some(config) = file_config {
        info!("📁 Client configuration loaded from file");
        settings.client = config;
    }

    info!("{}", trip_api_client::version_info());
    let client = ApiClient::new(settings.client).context("Failed to create API client")?;

    let output = match cli.command {
        Command::Generate { draft } => generate(client, draft).await?,
        Command::Trips { page, limit } => {
            let page = client.list_trips(&TripListQuery::page(page, limit)).await?;
            serde_json::to_value(page)?
        }
        Command::Trip { id } => serde_json::to_value(client.get_trip(&id).await?)?,
        Command::Info {
            topic,
            destination,
            nationality,
        } => client.info(topic, &destination, nationality.as_deref()).await?,
        Command::Chat { message } => client.send_chat_message(&ChatRequest::new(message)).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn generate(client: ApiClient, path: PathBuf) -> Result<Value> {
    let content = std::fs::read_to_string(&path).with_context(|| format!("Failed to read draft: {:?}", path))?;
    let draft: TripDraft = serde_json::from_str(&content).context("Draft must be a JSON object")?;

    let (tx, mut rx) = progress_channel();
    let reporter = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::LoadingMessage(message) => eprintln!("{}", message),
                ProgressEvent::Retrying {
                    attempt,
                    max_attempts,
                    delay,
                    message,
                    ..
                } => eprintln!(
                    "Attempt {}/{} failed ({}), retrying in {}ms",
                    attempt,
                    max_attempts,
                    message,
                    delay.as_millis()
                ),
                _ => {}
            }
        }
    });

    let outcome = TripOrchestrationFlow::new(client).with_progress(tx).create_trip(&draft).await;
    // The flow owns the only sender, so the reporter ends once it is dropped
    reporter.await.ok();

    match outcome {
        TripOutcome::Success(trip) => Ok(serde_json::to_value(trip)?),
        TripOutcome::PartialSuccess(trip) => {
            warn!("Trip created without AI recommendations");
            Ok(serde_json::to_value(trip)?)
        }
        TripOutcome::Failure(failure) => {
            for step in failure.error.recovery_steps() {
                eprintln!("  - {}", step);
            }
            if failure.can_retry {
                eprintln!("This looks temporary, try again in a moment.");
            }
            Err(failure.error.into())
        }
    }
}
