// ============================================================
// src/main.rs — payment-service (Rust + Actix-web)
// ============================================================
// Demo payment processor for the ecommerce stack. Outcomes are fabricated
// from a card-number heuristic and held in memory — in a real system this
// would call Stripe/PayPal APIs and persist to a database.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use std::env;

use payment_service::handlers;
use payment_service::metrics::PaymentMetrics;
use payment_service::store::TransactionStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let port = env::var("PORT").unwrap_or_else(|_| "8090".to_string());
    let addr = format!("0.0.0.0:{port}");

    // Shared state, owned here and handed to the app at construction
    let store = web::Data::new(TransactionStore::new());
    let metrics = web::Data::new(PaymentMetrics::new());

    info!("[payment-service] Listening on {addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .app_data(store.clone())
            .app_data(metrics.clone())
            .configure(handlers::routes)
    })
    .bind(&addr)?
    .run()
    .await
}
