//! Backend entry-point: bootstrap and HTTP bind.
//!
//! Bootstrap order matters: secrets and the pool come first, the idempotent
//! catalog seeding runs before the server accepts traffic, and the
//! readiness probe flips only after the listener is bound.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use domus_backend::Trace;
use domus_backend::domain::catalog::seed_catalogs;
use domus_backend::domain::token::TokenCodec;
use domus_backend::inbound::http::health::{self, HealthState};
use domus_backend::outbound::persistence::{DbPool, DieselCatalogRepository, PoolConfig};
use domus_backend::outbound::photos::DirPhotoStore;
use domus_backend::outbound::telegram::TelegramMessenger;
use domus_backend::server::{self, config::AppConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();
    let secret = config.load_signing_secret()?;
    let tokens = Arc::new(TokenCodec::new(&secret));
    info!(fingerprint = tokens.fingerprint(), "token signing secret loaded");

    let pool = DbPool::new(PoolConfig::new(&config.database_url).with_max_size(config.db_pool_size))
        .await
        .map_err(std::io::Error::other)?;

    seed_catalogs(&DieselCatalogRepository::new(pool.clone()))
        .await
        .map_err(std::io::Error::other)?;

    let messenger =
        TelegramMessenger::new(&config.telegram_bot_token).map_err(std::io::Error::other)?;
    let photos = DirPhotoStore::new(&config.uploads_dir).map_err(std::io::Error::other)?;

    let state = web::Data::new(server::build_state(pool, tokens, messenger, photos));
    let health_state = web::Data::new(HealthState::new());
    // Clones for the server factory so the probes stay reachable here.
    let server_state = state.clone();
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .configure(server::configure)
            .service(health::ready)
            .service(health::live)
    })
    .bind(config.bind_addr)?;

    info!(bind_addr = %config.bind_addr, "listening");
    health_state.mark_ready();
    server.run().await
}
