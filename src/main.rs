use retriage::infrastructure::config::AppConfig;
use retriage::infrastructure::db::Store;
use retriage::interfaces::http::start_server;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let store = Store::connect(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        database_url = %config.database_url,
        "starting feedback triage server"
    );
    start_server(&config, store)?.await
}
