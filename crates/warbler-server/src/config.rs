//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server starts with zero configuration
//! for local development.

use std::net::SocketAddr;

use anyhow::Context;

pub const DEV_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database path, or `:memory:`.
    /// Env: `DATABASE_URL`
    /// Default: `warbler.db`
    pub database_url: String,

    /// Secret used to sign session cookies.
    /// Env: `WARBLER_SECRET_KEY`
    /// Default: `dev-secret-change-me` (development only).
    pub secret_key: String,

    /// Env: `WARBLER_HOST` / `WARBLER_PORT`
    /// Default: `0.0.0.0:5000`
    pub addr: SocketAddr,

    /// Session lifetime in days.
    /// Env: `WARBLER_SESSION_DAYS`
    /// Default: `7`
    pub session_days: i64,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_or("DATABASE_URL", "warbler.db");
        let secret_key = env_or("WARBLER_SECRET_KEY", DEV_SECRET);

        let host = env_or("WARBLER_HOST", "0.0.0.0");
        let port: u16 = env_or("WARBLER_PORT", "5000")
            .parse()
            .context("WARBLER_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("WARBLER_HOST must be an IP address")?;

        let session_days: i64 = env_or("WARBLER_SESSION_DAYS", "7")
            .parse()
            .context("WARBLER_SESSION_DAYS must be a whole number of days")?;

        Ok(Self {
            database_url,
            secret_key,
            addr,
            session_days,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
