use tower_http::trace::TraceLayer;
use crate::config::{Config, Service};
use crate::http::*;
use crate::models::{DynStore, Store};
use anyhow::Context;
use axum::Router;
use sqlx::PgPool;
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

pub async fn serve(config: Config, db: PgPool) -> anyhow::Result<()> {
    let api_context = ApiContext {
        store: Arc::new(Store::new(db)) as DynStore,
    };

    let app = api_router(config.service, api_context);

    // Port is configured in .env
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    log::info!("serving {:?} on {}", config.service, addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("error running HTTP server")
}

fn api_router(service: Service, api_context: ApiContext) -> Router {
    let router = match service {
        Service::Tweet => tweets::router(),
        Service::User => users::router().merge(follows::router()),
        Service::All => tweets::router()
            .merge(users::router())
            .merge(follows::router()),
    };

    router
        // Unknown paths get the same JSON body as a missing resource.
        .fallback(not_found)
        // Enables logging. Use `RUST_LOG=tower_http=debug`
        .layer(TraceLayer::new_for_http())
        .with_state(api_context)
}

async fn not_found() -> Error {
    Error::NotFound
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
        // Without a signal handler there's nothing to wait for; keep serving.
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
