use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use anyhow::Context;
use mongodb::Client;
use std::sync::Arc;

use studyhub_server::{
    auth::{FirebaseVerifier, IdentityVerifier},
    config::{ServerConfig, ServiceAccount, StoreBackend},
    db::{MemoryUserStore, MongoDbContext, UserStore},
    routes,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting studyhub server...");

    let config = ServerConfig::load().context("Failed to load server configuration")?;

    let service_account = ServiceAccount::load_from_file(&config.service_account_path)
        .with_context(|| {
            format!(
                "Failed to load service account credentials from '{}' (set FIREBASE_SERVICE_ACCOUNT_JSON)",
                config.service_account_path.display()
            )
        })?;

    if config.client.api_key.is_empty() {
        log::warn!("F_API_KEY is not set; identity provider lookups will fail");
    }
    if !config.client.project_id.is_empty() && config.client.project_id != service_account.project_id
    {
        log::warn!(
            "F_PROJECT_ID ({}) differs from the service account project ({}); tokens are checked against the service account",
            config.client.project_id,
            service_account.project_id
        );
    }

    let http_client = reqwest::Client::builder()
        .build()
        .context("Failed to build identity provider HTTP client")?;

    let verifier: Arc<dyn IdentityVerifier> = Arc::new(FirebaseVerifier::new(
        http_client,
        &config.identity_endpoint,
        &config.client.api_key,
        &service_account.project_id,
    ));

    let store: Arc<dyn UserStore> = match config.store_backend {
        StoreBackend::Mongo => {
            log::info!("Connecting to MongoDB (database: {})...", config.database_name);
            let client = Client::with_uri_str(&config.mongodb_uri)
                .await
                .context("Failed to create MongoDB client")?;

            let db_context = MongoDbContext::new(client, &config.database_name);
            db_context
                .ping()
                .await
                .context("Failed to reach MongoDB")?;

            Arc::new(db_context.users())
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory document store; user data is lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    match &config.frontend_origin {
        Some(origin) => log::info!("CORS restricted to {}", origin),
        None => log::info!("CORS allows any origin"),
    }

    let client_config = config.client.clone();
    let frontend_origin = config.frontend_origin.clone();

    log::info!("Starting HTTP server at {}:{}...", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            // Shared state
            .app_data(web::Data::from(verifier.clone()))
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::new(client_config.clone()))
            // Middleware
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_middleware::Compress::default())
            .wrap(routes::cors_policy(frontend_origin.as_deref()))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    log::info!("Server stopped");
    Ok(())
}
