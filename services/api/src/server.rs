use crate::cli::{ServeArgs, ServeMode};
use crate::infra::{build_agent, build_backend, AppState};
use crate::routes::with_operational_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;
use union_action::chatops::agent_router;
use union_action::config::{AppConfig, ServerConfig};
use union_action::error::AppError;
use union_action::pipeline::backend_router;
use union_action::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    let target = match args.mode {
        ServeMode::Backend => &mut config.backend,
        ServeMode::Bundled | ServeMode::Agent => &mut config.server,
    };
    apply_overrides(target, &mut args);

    telemetry::init(&config.telemetry)?;

    // The layer pair installs a global recorder, so both services share it.
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let metrics = Arc::new(prometheus_handle);
    let started = Instant::now();

    let state = |errors| AppState {
        readiness: readiness_flag.clone(),
        metrics: metrics.clone(),
        errors,
        started,
    };

    let backend = match args.mode {
        ServeMode::Bundled | ServeMode::Backend => {
            let service = build_backend(&config)?;
            let app = with_operational_routes(backend_router(service))
                .layer(Extension(state(None)))
                .layer(prometheus_layer.clone());
            Some(bind(&config.backend, app).await?)
        }
        ServeMode::Agent => None,
    };

    let agent = match args.mode {
        ServeMode::Bundled | ServeMode::Agent => {
            let (agent, tracker) = build_agent(&config)?;
            let app = with_operational_routes(agent_router(agent))
                .layer(Extension(state(Some(tracker))))
                .layer(prometheus_layer);
            Some(bind(&config.server, app).await?)
        }
        ServeMode::Backend => None,
    };

    readiness_flag.store(true, Ordering::Release);

    match (backend, agent) {
        (Some(backend), Some(agent)) => {
            info!(
                ?config.environment,
                backend_addr = %backend.addr,
                agent_addr = %agent.addr,
                "union action bridge ready"
            );
            tokio::try_join!(backend.serve(), agent.serve())?;
        }
        (Some(backend), None) => {
            info!(?config.environment, addr = %backend.addr, "union action backend ready");
            backend.serve().await?;
        }
        (None, Some(agent)) => {
            info!(
                ?config.environment,
                addr = %agent.addr,
                backend_url = %config.bridge.union_action_url,
                "chat-ops agent ready"
            );
            agent.serve().await?;
        }
        (None, None) => {}
    }
    Ok(())
}

fn apply_overrides(target: &mut ServerConfig, args: &mut ServeArgs) {
    if let Some(host) = args.host.take() {
        target.host = host;
    }
    if let Some(port) = args.port.take() {
        target.port = port;
    }
}

struct BoundService {
    listener: TcpListener,
    addr: SocketAddr,
    app: Router,
}

impl BoundService {
    async fn serve(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.app).into_future().await
    }
}

async fn bind(server: &ServerConfig, app: Router) -> Result<BoundService, AppError> {
    let addr = server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    Ok(BoundService {
        listener,
        addr,
        app,
    })
}
