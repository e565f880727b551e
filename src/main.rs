mod app;
mod routes;
mod services;
mod session;
mod types;
mod utils;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    info!("Starting maps explorer...");

    let config = match app::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app = app::gen_app(config);

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
