//! Process configuration: CLI flags with environment fallbacks.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use uuid::Uuid;

use crate::domain::token::SigningSecret;

/// Runtime configuration for the backend process.
#[derive(Debug, Parser)]
#[command(name = "domus-backend", about = "Resident utilities backend")]
pub struct AppConfig {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Socket address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// File holding the token signing secret.
    #[arg(long, env = "TOKEN_SECRET_FILE", default_value = "/var/run/secrets/token_secret")]
    pub token_secret_file: PathBuf,

    /// Telegram bot token used by the messaging gateway.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: String,

    /// Directory receiving decoded meter photos.
    #[arg(long, env = "UPLOADS_DIR", default_value = "uploads")]
    pub uploads_dir: PathBuf,

    /// Maximum size of the database connection pool.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,
}

impl AppConfig {
    /// Read the signing secret from disk.
    ///
    /// Development builds (or `TOKEN_ALLOW_EPHEMERAL=1`) fall back to a
    /// generated secret so the server starts without provisioning; every
    /// restart then invalidates previously issued credentials.
    pub fn load_signing_secret(&self) -> std::io::Result<SigningSecret> {
        match std::fs::read(&self.token_secret_file) {
            Ok(bytes) => Ok(SigningSecret::new(bytes)),
            Err(error) => {
                let allow_dev =
                    std::env::var("TOKEN_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
                if cfg!(debug_assertions) || allow_dev {
                    warn!(
                        path = %self.token_secret_file.display(),
                        %error,
                        "using ephemeral signing secret (dev only)"
                    );
                    let mut bytes = Uuid::new_v4().as_bytes().to_vec();
                    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
                    Ok(SigningSecret::new(bytes))
                } else {
                    Err(std::io::Error::other(format!(
                        "failed to read signing secret at {}: {error}",
                        self.token_secret_file.display()
                    )))
                }
            }
        }
    }
}
