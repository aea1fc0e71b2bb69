//! Lesson Relay
//!
//! Server-side relay that forwards chat prompts from the course widget to
//! the Gemini API without exposing the API key to the browser.

use anyhow::Result;
use clap::Parser;
use lesson_relay::{
    config::{Environment, Settings},
    server::App,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Lesson Relay
///
/// Credential-shielding relay between the chat widget and Gemini.
#[derive(Parser, Debug)]
#[command(name = "lesson-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST env var)
    #[arg(long)]
    host: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Environment: dev, staging, prod (overrides ENVIRONMENT env var)
    #[arg(short, long)]
    env: Option<Environment>,

    /// Seconds to wait for Gemini before answering 504 (overrides UPSTREAM_TIMEOUT_SECONDS)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing GEMINI_API_KEY stops the process here
    let mut settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            std::process::exit(1);
        }
    };

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(env) = args.env {
        settings.environment = env;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.upstream_timeout_seconds = timeout_secs;
    }
    settings.validate()?;

    init_tracing(&settings.log_level);

    for warning in settings.warnings() {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        host = %settings.host,
        port = %settings.port,
        model = %settings.gemini.model,
        timeout_seconds = settings.upstream_timeout_seconds,
        "Starting application"
    );

    let app = App::new(settings)?;

    app.run_with_graceful_shutdown().await?;

    tracing::info!("Application shutdown complete");

    Ok(())
}

/// JSON logs to stdout, filtered by RUST_LOG or the configured level
fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().json().with_filter(filter))
        .init();
}
