use sclh::server::{config::Config, startup};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    startup::init_logging(&config);
    tracing::info!("Starting sclh");

    if let Err(e) = startup::run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
