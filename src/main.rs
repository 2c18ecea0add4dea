mod clients;
mod database;
mod error;
mod handlers;
mod models;
mod moderation;
mod rate_limit;
mod search;
mod slug;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::env;
use std::time::Duration;

use crate::clients::notify::NotifyClient;
use crate::database::Database;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8084".to_string());
    let bind_address = format!("{}:{}", host, port);
    let notify_service_url =
        env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8085".to_string());

    let database_url = env::var("DATABASE_URL").map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "DATABASE_URL must be set in environment",
        )
    })?;

    let db = Database::connect(&database_url).await.map_err(|err| {
        log::error!("Failed to initialize database: {err:?}");
        std::io::Error::new(std::io::ErrorKind::Other, err)
    })?;

    let db_data = web::Data::new(db);
    let notify_client = web::Data::new(NotifyClient::new(notify_service_url));

    // Spawn rate limiter cleanup task
    actix_web::rt::spawn(async {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limit::cleanup();
            log::debug!("Rate limiter cleanup completed");
        }
    });

    log::info!(
        "🚀 Starting TownSquare Directory Service on {}",
        bind_address
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(db_data.clone())
            .app_data(notify_client.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                web::scope("/api/v1")
                    // Health
                    .service(handlers::health_check)
                    // Directory search & fetch
                    .service(handlers::search_businesses)
                    .service(handlers::get_business_by_slug)
                    .service(handlers::get_business)
                    // Listing lifecycle
                    .service(handlers::create_business)
                    .service(handlers::update_business)
                    .service(handlers::delete_business)
                    // Moderation
                    .service(handlers::approve_business)
                    .service(handlers::reject_business)
                    .service(handlers::resubmit_business)
                    .service(handlers::claim_business)
                    .service(handlers::pending_businesses)
                    .service(handlers::directory_stats)
                    // Reviews
                    .service(handlers::create_review)
                    .service(handlers::list_reviews)
                    .service(handlers::update_review)
                    .service(handlers::delete_review)
                    .service(handlers::mark_review_helpful)
                    .service(handlers::respond_to_review)
                    .service(handlers::moderate_review)
                    // Categories
                    .service(handlers::list_categories)
                    .service(handlers::list_subcategories),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
