use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use storefront_service::infrastructure::json_store::JsonDocumentStore;
use storefront_service::{build_server, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let store = Arc::new(
        JsonDocumentStore::open(&data_dir)
            .unwrap_or_else(|e| panic!("Failed to open document store at {data_dir}: {e}")),
    );
    let state = AppState {
        catalog: store.clone(),
        orders: store,
    };

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Catalog API: http://{}:{}/api/products", host, port);

    build_server(state, &host, port)?.await
}
