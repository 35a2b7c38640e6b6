use crate::{
    cmd::{connect_cache, create_client},
    modules::handlers::{get_user_stats, liveness, readiness},
};
use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing, Router, Server,
};
use clap::Args;
use leetcode_stats_libs::{cache::DEFAULT_TTL_SECONDS, CacheFailurePolicy, StatsService};
use std::{env, net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    /// Keep cached entries in process memory instead of Redis.
    #[arg(long)]
    memory_cache: bool,
    /// Fail requests when the cache store is unreachable instead of bypassing it.
    #[arg(long)]
    cache_fail_closed: bool,
    /// Lifetime of cached entries in seconds.
    #[arg(long, default_value_t = DEFAULT_TTL_SECONDS)]
    cache_ttl: u64,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let client = create_client()?;
    let cache = connect_cache(args.memory_cache).await;
    let failure_policy = if args.cache_fail_closed {
        CacheFailurePolicy::FailClosed
    } else {
        CacheFailurePolicy::FailOpen
    };
    let service = StatsService::new(Arc::new(client), cache)
        .with_ttl(args.cache_ttl)
        .with_failure_policy(failure_policy);

    let origin = env::var("FRONTEND_ORIGIN_URL").unwrap_or_else(|_| {
        tracing::warn!("FRONTEND_ORIGIN_URL environment variable is not set. Default value `http://localhost:3000` will be used.");
        String::from("http://localhost:3000")
    });
    let origin: HeaderValue = origin.parse().with_context(|| {
        let message = format!("invalid FRONTEND_ORIGIN_URL `{}`", origin);
        tracing::error!(message);
        message
    })?;

    let app = create_router(service, origin);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")?;

    Ok(())
}

pub fn create_router(service: StatsService, origin: HeaderValue) -> Router {
    Router::new()
        .route("/user/:username", routing::get(get_user_stats))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .layer(Extension(Arc::new(service)))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE]),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("SIGINT signal received, starting graceful shutdown.");
}
