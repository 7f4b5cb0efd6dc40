mod config;
mod constants;
mod error;
mod models;
mod oauth;
mod pipeline;
mod platforms;
mod routes;
mod services;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::oauth::OAuthClient;
use crate::pipeline::VideoPipeline;
use crate::platforms::PlatformRegistry;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<Store>,
    pub oauth: Arc<OAuthClient>,
    pub pipeline: Arc<VideoPipeline>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let store = Arc::new(match &config.data_path {
        Some(path) => Store::on_disk(path),
        None => {
            tracing::warn!("DATA_PATH not set, data will not survive a restart");
            Store::in_memory()
        }
    });

    let oauth = Arc::new(OAuthClient::from_env(&config.app_url));
    let platforms = Arc::new(PlatformRegistry::stubs());
    let pipeline = VideoPipeline::with_poll_interval(
        store.clone(),
        platforms,
        oauth.clone(),
        Duration::from_secs(config.analytics_poll_secs),
    );

    // Re-arm pending schedules and analytics polls from the stored records
    pipeline.restore();

    let state = Arc::new(AppState {
        store,
        oauth,
        pipeline,
    });

    // Anything that is not an API route falls through to the dashboard
    let index = format!("{}/index.html", config.static_dir);
    let spa = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(index));

    let app = routes::build_routes()
        .fallback_service(spa)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    tracing::info!("Listening on http://{}", addr);
    // Socket addresses back the rate limiter for clients without proxy headers
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server failed");

    state.pipeline.shutdown();
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    tracing::info!("Shutting down");
}
