use std::env;
use tokio::net::TcpListener;

use upload_guard::config::{Config, LogFormat};
use upload_guard::handlers::create_router;
use upload_guard::logging::init_tracing;
use upload_guard::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_tracing(LogFormat::from_value(env::var("LOG_FORMAT").ok().as_deref()));

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    tracing::info!("Starting upload admission service");
    tracing::info!("Allowed file types: {}", config.allowed_file_types);
    tracing::info!("Max file size: {}KB", config.max_file_size_kb);
    tracing::info!("Max concurrent requests: {}", config.max_concurrent_requests);

    let state = AppState::new(config)?;
    let app = create_router(state);

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
