use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compliance_api::app::{app, AppState};
use compliance_api::auth::{generate_jwt, Claims};
use compliance_api::config::{self, AppConfig, StoreKind};

#[derive(Parser)]
#[command(name = "compliance-api")]
#[command(about = "Task CRUD backend for the compliance-management platform")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides API_PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Task store backend: memory or postgres (overrides TASKS_STORE)")]
        store: Option<StoreKind>,
    },

    #[command(about = "Mint a development bearer token signed with SECURITY_JWT_SECRET")]
    Token {
        #[arg(long, help = "Subject claim")]
        subject: String,

        #[arg(long, help = "Hours until expiry (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = config::config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None, store: None }) {
        Commands::Serve { port, store } => serve(config, port, store).await,
        Commands::Token { subject, hours } => {
            let secret = config
                .security
                .jwt_secret
                .as_deref()
                .context("SECURITY_JWT_SECRET must be set to mint tokens")?;
            let claims = Claims::new(subject, hours.unwrap_or(config.security.jwt_expiry_hours))?;
            println!("{}", generate_jwt(secret, &claims)?);
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>, store: Option<StoreKind>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }
    if let Some(store) = store {
        config.tasks.store = store;
    }

    tracing::info!(
        "Starting Compliance API in {:?} mode with {:?} store",
        config.environment,
        config.tasks.store
    );

    let state = AppState::from_config(&config).await?;
    let router = app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Compliance API listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
