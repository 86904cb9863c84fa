mod ai;
mod api;
mod canvas;
mod config;
mod flows;
mod tui;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::Request;
use clap::Parser;
use dotenvy::dotenv;
use sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::ai::client::{CompletionClient, OpenRouterClient};
use crate::flows::memory_repository::MemoryFlowRepository;
use crate::flows::mongo_repository::MongoFlowRepository;
use crate::flows::repository::FlowRecordRepository;

#[derive(Parser)]
#[command(name = "promptflow", about = "Prompt -> AI response flow editor")]
enum Cli {
    /// Start the HTTP server (default when no subcommand is given)
    #[command(alias = "run")]
    Serve {
        /// Keep saved flows in memory instead of MongoDB
        #[arg(long)]
        memory_store: bool,
    },
    /// Open the terminal canvas
    Tui {
        /// Server URL to connect to
        #[arg(long, default_value = "http://localhost:5000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    // Default to Serve when no subcommand is given, but still allow
    // --help and --version to work.
    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() <= 1 {
        Cli::Serve {
            memory_store: false,
        }
    } else {
        Cli::parse()
    };

    match cli {
        Cli::Serve { memory_store } => run_server(memory_store).await,
        Cli::Tui { server } => {
            tui::run(server).await?;
            Ok(())
        }
    }
}

async fn run_server(memory_store: bool) -> Result<(), Box<dyn Error>> {
    let config = config::Config::from_env();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("promptflow=info,tower_http=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(false),
        )
        .with(sentry::integrations::tracing::layer().event_filter(
            |metadata| match *metadata.level() {
                tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    sentry::integrations::tracing::EventFilter::Breadcrumb
                }
                _ => sentry::integrations::tracing::EventFilter::Ignore,
            },
        ))
        .init();

    let _guard = sentry::init((
        config.sentry_dsn.clone().unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            traces_sample_rate: 0.2,
            enable_logs: true,
            ..Default::default()
        },
    ));

    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    if config.openrouter_api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; /api/ask-ai will fail");
    }
    let completion_client: Arc<dyn CompletionClient> = Arc::new(OpenRouterClient::new(
        http_client,
        config.openrouter_api_key.clone(),
    ));

    let flow_repo = open_flow_store(memory_store, config.mongodb_uri.as_deref()).await;

    let app_state = api::AppState {
        completion_client,
        flow_repo,
    };

    let app = api::create_app(app_state)
        .layer(SentryHttpLayer::new().enable_transaction())
        .layer(NewSentryLayer::<Request<Body>>::new_from_top());

    let port = config.port;
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "server running");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Pick the record store. A store that cannot be reached at startup is
/// still installed: every save then fails with a 500 until it comes back.
/// The reachability ping runs in the background, so this never waits on
/// MongoDB server selection.
async fn open_flow_store(
    memory_store: bool,
    mongodb_uri: Option<&str>,
) -> Option<Arc<dyn FlowRecordRepository>> {
    if memory_store {
        tracing::info!("using in-memory flow store (--memory-store)");
        return Some(Arc::new(MemoryFlowRepository::new()) as Arc<dyn FlowRecordRepository>);
    }

    let Some(uri) = mongodb_uri else {
        tracing::error!("MONGODB_URI is not set; /api/save-flow will fail");
        return None;
    };

    match MongoFlowRepository::connect(uri).await {
        Ok(repo) => {
            let repo = Arc::new(repo);
            // Server selection can take the driver's full timeout; listen first.
            let pinger = repo.clone();
            tokio::spawn(async move {
                match pinger.ping().await {
                    Ok(()) => tracing::info!("connected to MongoDB"),
                    Err(e) => tracing::error!(error = %format!("{e:#}"), "MongoDB connection error"),
                }
            });
            Some(repo as Arc<dyn FlowRecordRepository>)
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "MongoDB connection error");
            None
        }
    }
}
