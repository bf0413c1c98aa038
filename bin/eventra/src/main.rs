//! # Eventra Binary
//!
//! The entry point that assembles the application from settings and the
//! compiled-in plugins.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use ev_api::catalog::Catalog;
use ev_api::handlers::AppState;
use ev_api::{configure_routes, middleware};
use ev_config::Settings;
use ev_core::traits::{HttpTransport, KeyValueStore};
use ev_core::{AuthNegotiator, ExpiringCache, SessionManager};
use ev_http_reqwest::{BackendClient, GithubClient, ReqwestTransport};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "store-file")]
use ev_store_file::FileStore;

#[cfg(not(feature = "store-file"))]
use ev_core::MemoryStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Settings::load reads `.env` first, so RUST_LOG may come from there.
    let settings = Settings::load().context("loading settings");
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let settings = settings?;

    // 1. Key-value store for the session and the contributors cache
    #[cfg(feature = "store-file")]
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(settings.storage.root.clone()));
    #[cfg(not(feature = "store-file"))]
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    // 2. Restore any persisted login
    let session = Arc::new(SessionManager::new(store.clone()));
    if let Some(restored) = session.init().await {
        log::info!("restored session for {}", restored.user.email);
    }

    // 3. Outbound HTTP
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new()?);
    let auth = AuthNegotiator::new(transport.clone(), settings.backend.login_url(), session.clone());
    let backend = BackendClient::new(transport.clone(), settings.backend.base_url.clone());
    let github = GithubClient::new(
        transport,
        settings.github.api_url.clone(),
        settings.github.repo.clone(),
        settings.github.lead.clone(),
        settings.github.token.clone(),
        ExpiringCache::new(store, Duration::from_secs(settings.github.cache_ttl_secs)),
    );

    // 4. Seed listings
    let catalog = Catalog::load(&settings.server.data_dir)
        .await
        .with_context(|| format!("loading seed data from {}", settings.server.data_dir.display()))?;

    let state = web::Data::new(AppState { catalog, backend, auth, session, github });

    let (host, port) = (settings.server.host.clone(), settings.server.port);
    log::info!("Eventra starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .wrap(middleware::security_headers())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
