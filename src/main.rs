//! piControl host binary: load config, discover modules, start the
//! heartbeat scheduler, serve.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use picontrol::config::AppConfig;
use picontrol::http::app_router;
use picontrol::modules::builtin_catalog;
use picontrol::realtime::{ConnectionSet, HeartbeatScheduler};
use picontrol::registry::{HostContext, ModuleRegistry, RealtimeContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    let config = Arc::new(config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let connections = Arc::new(ConnectionSet::new());
    let host = HostContext {
        config: config.clone(),
    };
    let realtime = RealtimeContext {
        connections: connections.clone(),
    };

    // Module loading is synchronous and completes before the server accepts
    // anything: the route table, action list, and bundle are immutable by
    // the time requests can arrive.
    let registry = Arc::new(ModuleRegistry::load(
        &config.modules.root,
        builtin_catalog(),
        host,
        realtime,
    )?);

    let app = app_router(registry.clone(), connections.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    HeartbeatScheduler::new(registry, connections, config.heartbeat.interval()).spawn();

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "piControl listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
