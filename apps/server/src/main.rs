//! Todo Server binary.

use std::net::SocketAddr;

use task_store::{MemoryTaskStore, PostgresTaskStore, SqliteTaskStore, TaskStore};
use todo_server::{
    config::{Config, StoreBackend},
    create_app, create_state, init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // The backend is fixed for the lifetime of the process.
    let backend = config.backend()?;
    tracing::info!(?backend, "Starting Todo Server");

    match backend {
        StoreBackend::Memory => serve(config, MemoryTaskStore::new()).await,
        StoreBackend::Sqlite => {
            let store = SqliteTaskStore::connect(&config.database_url).await?;
            serve(config, store).await
        }
        StoreBackend::Postgres => {
            let store = PostgresTaskStore::connect(&config.database_url).await?;
            serve(config, store).await
        }
    }
}

async fn serve<S: TaskStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;

    // Create application state and router
    let state = create_state(config, store);
    let app = create_app(state);

    tracing::info!(addr = %addr, "Server listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
