//! Compliance Engine HTTP Server binary

use axum::{
    routing::{get, post},
    Router,
};
use compliance_core::config::EngineConfig;
use compliance_core::repository::postgres::PostgresRepository;
use compliance_core::stream::NullSink;
use compliance_server::{handlers, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let enable_otel = std::env::var("OTEL_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if enable_otel {
        compliance_server::tracing::init_tracing_stack("compliance-server")?;
        info!("OpenTelemetry tracing enabled");
    } else {
        use tracing_subscriber::{EnvFilter, FmtSubscriber};
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,compliance=debug")),
            )
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        info!("Console logging enabled (set OTEL_ENABLED=true for OpenTelemetry)");
    }

    info!("Starting compliance-server v{}", env!("CARGO_PKG_VERSION"));

    compliance_server::metrics::init_prometheus()?;
    compliance_server::metrics::init_metrics();

    let config = EngineConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    let uow: Arc<dyn compliance_core::repository::traits::UnitOfWork> =
        Arc::new(PostgresRepository::new(pool));

    // No websocket relay ships in this crate (out of scope) — a future
    // one would swap this for a `ChannelSink`.
    let stream: Arc<dyn compliance_core::stream::StreamSink> = Arc::new(NullSink);

    let debug = std::env::var("DEBUG").is_ok();
    let state = AppState::with_debug(uow, stream, config, debug);

    let app = Router::new()
        .route("/v1/organizations/:org/transactions", post(handlers::ingest_transaction))
        .route("/v1/organizations/:org/templates", get(handlers::list_templates).post(handlers::create_template))
        .route("/v1/organizations/:org/templates/:id", get(handlers::get_template))
        .route("/v1/organizations/:org/templates/:id/deactivate", post(handlers::deactivate_template))
        .route("/v1/organizations/:org/versions", post(handlers::create_version))
        .route("/v1/organizations/:org/versions/:id/activate", post(handlers::activate_version))
        .route("/v1/organizations/:org/versions/:id/deactivate", post(handlers::deactivate_version))
        .route("/v1/organizations/:org/alerts", get(handlers::list_alerts))
        .route("/v1/organizations/:org/alerts/:id", get(handlers::get_alert).patch(handlers::transition_alert))
        .route("/health/live", get(handlers::health_live))
        .route("/health/ready", get(handlers::health_ready))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server = axum::serve(listener, app);

    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, shutting down gracefully...");
    };

    server.with_graceful_shutdown(shutdown_signal).await.map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    if enable_otel {
        info!("Flushing OpenTelemetry traces...");
        compliance_server::tracing::shutdown_telemetry();
    }

    info!("Server shutdown complete");
    Ok(())
}
