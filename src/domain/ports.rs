use uuid::Uuid;

use super::cart::CartLine;
use super::errors::{DispatchError, StoreError};
use super::order::Order;
use super::product::Product;

/// Read side of the product catalog.
pub trait CatalogStore: Send + Sync + 'static {
    fn find(&self, id: &str) -> Result<Option<Product>, StoreError>;
    fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError>;
    fn insert(&self, product: Product) -> Result<(), StoreError>;
}

/// Durable cart snapshots, written after every cart mutation so the
/// cart survives process restarts.
pub trait CartStore: Send + Sync + 'static {
    fn save(&self, lines: &[CartLine]) -> Result<(), StoreError>;
    fn load(&self) -> Result<Vec<CartLine>, StoreError>;
}

/// Order persistence. A save failure must not block the buyer-visible
/// success path; callers log it and fall back.
pub trait OrderStore: Send + Sync + 'static {
    fn save(&self, order: &Order) -> Result<Uuid, StoreError>;
    /// All orders, newest first.
    fn list(&self) -> Result<Vec<Order>, StoreError>;
}

/// Summary handed to the confirmation notification after an order is
/// placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub order_id: String,
    pub amount: i64,
    pub item_count: usize,
    pub customer_name: String,
}

/// Best-effort notification channel, mediated by the backend so no
/// dispatch credentials ever live in buyer-reachable code.
pub trait NotificationDispatcher: Send + Sync + 'static {
    fn send_code(&self, destination: &str, code: &str) -> Result<(), DispatchError>;
    fn send_order_confirmation(
        &self,
        destination: &str,
        summary: &OrderSummary,
    ) -> Result<(), DispatchError>;
}
