//main.rs
use std::net::SocketAddr;

use code_manager::api::routes;
use code_manager::state::AppState;
use tokio::net::TcpListener;
use util::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::snapshot();

    let _log_guard =
        common::logger::init_logging(&config.log_file, &config.log_level, config.log_to_stdout);

    let state = AppState::from_global()?;
    let app = routes(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(
        %addr,
        env = %config.env,
        max_concurrent_runs = config.max_concurrent_runs,
        "Starting {}",
        config.project_name
    );

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
