use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use devevent_server::config::Config;
use devevent_server::routes::create_routes;
use devevent_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("devevent_server=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL is not set; event and booking requests will fail");
    }

    let state = AppState::from_config(&config)?;
    let app = create_routes(state, config.production);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
