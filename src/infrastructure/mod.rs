pub mod json_store;
pub mod models;
pub mod notifier;
