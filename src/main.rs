use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_agent_bridge::{create_router, AppState, ChatClient, Config};

#[derive(Parser)]
#[command(name = "voice-agent-bridge", version, about = "Voice agent integration backend")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/voice-agent-bridge")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP backend (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one chat message through a running backend
    Chat {
        text: String,
        #[arg(long, default_value = "http://localhost:3000")]
        backend_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&cli.config, port).await,
        Command::Chat { text, backend_url } => {
            let reply = ChatClient::new(backend_url).send(&text).await?;
            println!("{}", reply);
            Ok(())
        }
    }
}

async fn serve(config_path: &str, port: Option<u16>) -> Result<()> {
    let mut cfg = Config::load(config_path)?;
    if let Some(port) = port {
        cfg.service.http.port = port;
    }

    info!("Loaded config: {}", cfg.service.name);
    info!("Agent API: {}", cfg.agent.api_base_url);
    let webhook = if cfg.webhook.url.is_empty() {
        "(unset)"
    } else {
        cfg.webhook.url.as_str()
    };
    info!("Webhook: {}", webhook);

    let state = AppState::from_config(&cfg)?;
    let app = create_router(state, &cfg.service.frontend_origin);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Backend server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
