// src/main.rs
use anyhow::{Context, Result};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use distro_proxy::{
    config,
    metrics::MetricsRegistry,
    proxy::DistroProxy,
    server::{self, RequestHandler, ServerBuilder},
    upstream::ReqwestUpstream,
};

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` first so RUST_LOG and the config layer both see it
    let dotenv_path = config::load_dotenv();
    
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("distro_proxy=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();
    
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "distro-proxy.yaml".to_string());
    
    if let Some(path) = &dotenv_path {
        info!("Loaded environment file: {}", path.display());
    }
    info!("Loading configuration from: {} (+ environment)", config_path);
    let config = match config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {:#}", e);
            return Err(e);
        }
    };
    info!("Configuration loaded: {:?}", config);
    
    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;
    let metrics = config
        .metrics
        .enabled
        .then(|| metrics_registry.collector());
    
    let upstream = Arc::new(ReqwestUpstream::new().context("Failed to create HTTP client")?);
    let proxy = Arc::new(DistroProxy::new(&config, upstream, metrics.clone()));
    
    // Start metrics server if enabled
    if config.metrics.enabled {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics.path.clone()).await?;
    }
    
    let handler = RequestHandler::new(proxy, metrics);
    
    info!(
        "Proxying {} (monitoring {})",
        config.wordpress_api_base_url, config.monitor_site_url
    );
    
    ServerBuilder::new(config.listen_addr)
        .with_handler(server::app(handler))
        .serve_with_shutdown(shutdown_signal())
        .await?;
    
    info!("Shut down cleanly");
    Ok(())
}

async fn start_metrics_server(
    addr: SocketAddr,
    registry: MetricsRegistry,
    path: String,
) -> Result<()> {
    let registry = Arc::new(registry);
    let metrics_path = Arc::new(path);
    let service_path = metrics_path.clone();

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move {
                    let response = if req.uri().path() != path.as_str() {
                        plain_response(StatusCode::NOT_FOUND, Body::from("Not Found"))
                    } else {
                        match registry.gather() {
                            Ok(metrics) => {
                                let mut response = plain_response(StatusCode::OK, Body::from(metrics));
                                response.headers_mut().insert(
                                    CONTENT_TYPE,
                                    HeaderValue::from_static("text/plain; version=0.0.4"),
                                );
                                response
                            }
                            Err(e) => {
                                error!("Failed to encode metrics: {}", e);
                                plain_response(StatusCode::INTERNAL_SERVER_ERROR, Body::empty())
                            }
                        }
                    };
                    Ok::<_, Infallible>(response)
                }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind metrics listener on {}", addr))?
        .serve(make_service);

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

fn plain_response(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };
    
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };
    
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    
    info!("Shutdown signal received");
}
