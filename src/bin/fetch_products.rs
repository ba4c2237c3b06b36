//! Pull the product feed and upsert it into the catalog.

use dotenvy::dotenv;

use pushkind_store::config::ImportConfig;
use pushkind_store::db::establish_connection_pool;
use pushkind_store::repository::DieselRepository;
use pushkind_store::services::catalog_import::{fetch_catalog, import_catalog};

#[actix_web::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok();

    let config = match ImportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    log::info!("Fetching catalog from {}", config.source_url);
    let feed = match fetch_catalog(&config.source_url).await {
        Ok(feed) => feed,
        Err(e) => {
            log::error!("Failed to fetch catalog: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = import_catalog(&repo, feed) {
        log::error!("Catalog import aborted: {e}");
        std::process::exit(1);
    }
}
