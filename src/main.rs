use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use pushkind_store::config::ServerConfig;
use pushkind_store::db::establish_connection_pool;
use pushkind_store::identity::Auth0Gateway;
use pushkind_store::repository::DieselRepository;
use pushkind_store::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    log::debug!("Starting with {config:?}");

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = web::Data::new(DieselRepository::new(pool));

    let gateway = match Auth0Gateway::from_config(&config.identity).await {
        Ok(gateway) => web::Data::new(gateway),
        Err(e) => {
            log::error!("Failed to initialize identity gateway: {e}");
            std::process::exit(1);
        }
    };

    log::info!("Listening on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(repo.clone())
            .app_data(gateway.clone())
            .service(web::scope("/api/v1").configure(routes::configure))
            .configure(routes::configure)
    })
    .bind((config.address.as_str(), config.port))?
    .run()
    .await
}
