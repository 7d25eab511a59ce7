//! Links HTTP surface
//!
//! Browser-facing endpoints over [`links_core::Links`]. Every route except
//! the login pages requires a registered device cookie.

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use links_core::Links;

mod auth;
mod dto;
mod error;
mod handlers;
mod pages;


pub use dto::ItemsResponse;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) links: Links,
}

/// Serve HTTP on the configured bind address until Ctrl-C.
///
/// # Errors
/// Returns an error when the runtime cannot be created, the socket cannot be
/// bound, or the server exits with a runtime failure.
pub fn serve(links: Links) -> Result<()> {
    let bind_addr = links.config().bind.clone();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build server runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind links server at {bind_addr}"))?;
        tracing::info!(addr = %listener.local_addr()?, "Links server listening");

        axum::serve(listener, app_router(AppState { links }))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("links server failed")
    })
}

pub(crate) fn app_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(handlers::index))
        .route("/new", get(handlers::new_alias_page))
        .route("/items", get(handlers::items).post(handlers::create_item))
        .route("/logs", get(handlers::logs))
        .route("/stats", get(handlers::stats))
        .route("/expand/html", get(handlers::expand_html))
        .route("/api/expand", get(handlers::api_expand))
        .route("/api/opensearch", get(handlers::opensearch_suggestions))
        .route("/opensearch.xml", get(handlers::opensearch_xml))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_device,
        ));

    Router::new()
        .merge(protected)
        .route("/login", get(handlers::login_page).post(handlers::login))
        .with_state(state)
}
