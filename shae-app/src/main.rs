//! SHAE terminal client.

mod chat;
mod commands;
mod config;
mod driver;
mod session;

use clap::{Parser, Subcommand};
use shae_actions::ActionCatalog;
use shae_api::ShaeClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Parser)]
#[command(name = "shae", version, about = "SHAE companion chat client")]
struct Cli {
    /// Config file. Default: ~/.shae/config.toml
    #[arg(long, global = true, env = "SHAE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chat with SHAE in the terminal (default).
    Chat,
    /// Probe the reply service's /health endpoint.
    Health,
    /// Forget the stored session id.
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;
    install_panic_hook();

    let cli = Cli::parse();
    let cfg = config::ShaeConfig::load(cli.config).await?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat(cfg).await,
        Command::Health => {
            let client = ShaeClient::new(&cfg.backend.base_url, cfg.request_timeout())?;
            if client.health().await {
                println!("shae health: ok ({})", client.base_url());
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "reply service at {} is not healthy",
                    client.base_url()
                ))
            }
        }
        Command::Reset => {
            let store = session::SessionStore::new(&cfg.data_dir());
            if store.clear().await? {
                println!("shae reset: cleared session id in {}", store.path().display());
            } else {
                println!("shae reset: no stored session id");
            }
            Ok(())
        }
    }
}

async fn chat(cfg: config::ShaeConfig) -> anyhow::Result<()> {
    let client = ShaeClient::new(&cfg.backend.base_url, cfg.request_timeout())?;
    let store = session::SessionStore::new(&cfg.data_dir());
    let session_id = store.get_or_create().await?;
    tracing::info!(
        session_id = %session_id,
        base_url = %client.base_url(),
        app_env = ?cfg.general.app_env,
        "starting chat"
    );

    let session = chat::ChatSession::new(
        session_id,
        Arc::new(client),
        ActionCatalog::builtin(),
        cfg.general.app_env,
        cfg.pacing,
    );
    let driver = driver::Driver::new(session, store, std::io::stdout());
    driver::run(driver).await
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(v) => v,
        Err(_) => EnvFilter::new(
            "info,shae=debug,shae_app=debug,shae_actions=debug,shae_api=debug",
        ),
    };
    let log_format = std::env::var("SHAE_LOG_FORMAT")
        .unwrap_or_else(|_| "compact".to_string())
        .to_ascii_lowercase();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match log_format.as_str() {
        "json" => builder
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
            .init(),
        "pretty" => builder.pretty().init(),
        "compact" => builder.compact().init(),
        other => {
            return Err(anyhow::anyhow!(
                "unsupported SHAE_LOG_FORMAT={other:?}; expected one of: json, pretty, compact"
            ));
        }
    }

    tracing::debug!(log_format = %log_format, "tracing initialized");
    Ok(())
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_to_string(panic_info.payload());
        tracing::error!(
            panic_location = %location,
            panic_payload = %payload,
            "panic captured"
        );
        default_hook(panic_info);
    }));
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return msg.to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}
