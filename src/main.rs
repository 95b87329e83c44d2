use provador::{
    logger::{self, LoggerConfig},
    Config, GeminiImageClient, TransientStore, TryOnService,
};
use std::sync::Arc;
use std::time::Duration;

const REAPER_MIN_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    if let Err(e) = config.validate() {
        log::error!("❌ {}", e);
        return Err(e.into());
    }

    let client = GeminiImageClient::new(config.gemini.clone())?;
    log::info!("✅ Gemini client initialized for {}", client.endpoint());

    let mut service = TryOnService::new(Arc::new(client), config.fallback_mime.clone());

    if config.artifacts.persist {
        let store = TransientStore::new(&config.artifacts)?;
        let every = (store.ttl() / 4).max(REAPER_MIN_INTERVAL);
        store.spawn_reaper(every);
        log::info!(
            "🧹 Artifact reaper running every {}s in {}",
            every.as_secs(),
            store.dir().display()
        );
        service = service.with_store(store);
    }

    provador::server::run(&config, service).await?;

    log::info!("👋 Server stopped");
    Ok(())
}
