//! Demo service wired with the capture middleware.
//!
//! Loads a config file (or the environment), initializes logging and
//! metrics, builds the capture client and serves a few routes until Ctrl-C.

use std::path::PathBuf;
use std::time::Duration;

use apitoolkit_axum::config::{config_from_env, load_config};
use apitoolkit_axum::observability::{logging, metrics};
use apitoolkit_axum::{capture_middleware, Client, ErrorRecorder, MessageId};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

#[derive(Parser)]
#[command(name = "capture-demo")]
#[command(about = "Demo axum service reporting traffic to APIToolkit", long_about = None)]
struct Cli {
    /// Path to a TOML config file; the environment is used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Seconds to wait for pending captures on shutdown.
    #[arg(long, default_value_t = 5)]
    flush_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => config_from_env()?,
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("capture-demo v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = Client::new(config).await?;

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/users/{id}", get(get_user))
        .route("/login", post(login))
        .route("/fail", get(fail))
        .layer(axum::middleware::from_fn_with_state(client.clone(), capture_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    if !client.flush(Duration::from_secs(cli.flush_secs)).await {
        tracing::warn!(pending = client.in_flight(), "Captures still pending at exit");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn get_user(Path(id): Path<String>, Extension(msg_id): Extension<MessageId>) -> Json<Value> {
    Json(json!({ "id": id, "msg_id": msg_id.as_str() }))
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    let user = body.get("user").cloned().unwrap_or(Value::Null);
    Json(json!({ "user": user, "token": "demo-token" }))
}

async fn fail(Extension(errors): Extension<ErrorRecorder>) -> StatusCode {
    let err = std::io::Error::new(std::io::ErrorKind::Other, "upstream unavailable");
    errors.report(&err);
    StatusCode::BAD_GATEWAY
}
