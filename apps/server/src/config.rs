//! Server configuration.

use std::env;

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process volatile store.
    Memory,
    /// Embedded SQLite file.
    Sqlite,
    /// Networked PostgreSQL server.
    Postgres,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL. `memory` selects the volatile store.
    pub database_url: String,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("TODO_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("TODO_SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:todos.db?mode=rwc".to_string()),
            log_level: env::var("TODO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Picks the storage backend from the database URL scheme.
    pub fn backend(&self) -> anyhow::Result<StoreBackend> {
        let url = self.database_url.as_str();
        if url == "memory" || url.starts_with("memory:") {
            Ok(StoreBackend::Memory)
        } else if url.starts_with("sqlite:") {
            Ok(StoreBackend::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StoreBackend::Postgres)
        } else {
            anyhow::bail!("unsupported DATABASE_URL: {url}")
        }
    }
}
