//! ---
//! flk_section: "01-core-functionality"
//! flk_subsection: "binary"
//! flk_type: "source"
//! flk_scope: "code"
//! flk_description: "Binary entrypoint for the fleetlinkd daemon."
//! flk_version: "v0.1.0"
//! flk_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use fleetlink_bridge::{BridgeMetrics, MessageBridge, TopicSet};
use fleetlink_common::{init_tracing, BridgeSettings};
use fleetlink_mqtt::{MqttDriver, MqttSettings};
use fleetlink_orchestrator::GrpcOrchestrator;
use prometheus::{Registry, TextEncoder, TEXT_FORMAT};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let settings =
        BridgeSettings::from_env().context("failed to load settings from the environment")?;
    init_tracing("fleetlinkd", &settings.logging)?;

    let namespace = settings.namespace();
    info!(
        vehicle = %settings.vehicle,
        namespace = %namespace,
        broker = %settings.broker,
        orchestrator = %settings.orchestrator_endpoint,
        "fleetlinkd starting"
    );

    let registry = Arc::new(Registry::new());
    let metrics = BridgeMetrics::register(&registry)?;

    // The orchestrator channel is established before touching the broker;
    // without it the bridge has nothing to serve.
    let orchestrator = GrpcOrchestrator::connect(&settings.orchestrator_endpoint)
        .await
        .with_context(|| {
            format!(
                "failed to connect to the orchestrator at {}",
                settings.orchestrator_endpoint
            )
        })?;

    let (link, eventloop) = fleetlink_mqtt::open(MqttSettings {
        host: settings.broker.host.clone(),
        port: settings.broker.port,
        client_id: format!("fleetlink-{}", settings.vehicle),
    });

    let bridge = MessageBridge::new(
        TopicSet::new(&namespace),
        Arc::new(orchestrator),
        Arc::new(link),
        metrics,
    );
    let driver = MqttDriver::new(eventloop, Arc::new(bridge));

    let metrics_server = match settings.metrics_addr {
        Some(addr) => Some(spawn_metrics_server(addr, registry.clone())?),
        None => None,
    };

    tokio::select! {
        result = driver.run() => {
            result.context("broker session failed")?;
        }
        _ = shutdown_signal() => {
            info!("termination signal received; shutting down");
        }
    }

    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }

    Ok(())
}

/// Spawn an HTTP server that exposes the registry at `/metrics`.
fn spawn_metrics_server(addr: SocketAddr, registry: Arc<Registry>) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get({
            let registry = registry.clone();
            move || metrics_handler(registry.clone())
        }),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {addr}"))?;
    std_listener
        .set_nonblocking(true)
        .context("failed to configure metrics listener as non-blocking")?;
    let listener = TcpListener::from_std(std_listener)
        .context("failed to convert std listener into tokio listener")?;

    info!(address = %addr, "metrics exporter listening");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let service = app.into_make_service();
    let task: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        shutdown: Some(shutdown_tx),
        task,
    })
}

async fn metrics_handler(registry: Arc<Registry>) -> Response {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_FORMAT))],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding error").into_response()
        }
    }
}

/// Handle to the running metrics exporter.
struct MetricsServer {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    /// Signal shutdown and await task completion.
    async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
