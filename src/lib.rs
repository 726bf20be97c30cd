pub mod application;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};

use domain::ports::{CatalogStore, OrderStore};

/// Shared collaborators handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
}

/// Mount the storefront API under `/api`. Shared between the real
/// server and in-process test services.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/products", web::get().to(handlers::products::get_products))
            .route(
                "/products",
                web::post().to(handlers::products::create_product),
            )
            .route(
                "/products/category/{category}",
                web::get().to(handlers::products::get_products_by_category),
            )
            .route(
                "/products/{id}",
                web::get().to(handlers::products::get_product),
            )
            .route("/orders", web::post().to(handlers::orders::create_order))
            .route("/orders", web::get().to(handlers::orders::list_orders)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing)
/// the returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(configure_api)
    })
    .bind((host.to_string(), port))?
    .run())
}
