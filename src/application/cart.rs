use std::sync::Arc;

use crate::domain::cart::{Cart, CartLine};
use crate::domain::errors::CartError;
use crate::domain::ports::{CartStore, CatalogStore};

/// Cart operations for one buyer session: catalog lookups, price
/// snapshots, and a durable cart snapshot written after every mutation.
pub struct CartManager {
    cart: Cart,
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn CartStore>,
}

impl CartManager {
    /// Restore the persisted cart, or start empty when the store has
    /// nothing (or cannot be read).
    pub fn restore(catalog: Arc<dyn CatalogStore>, store: Arc<dyn CartStore>) -> Self {
        let cart = match store.load() {
            Ok(lines) => Cart::from_lines(lines),
            Err(e) => {
                log::warn!("Could not restore cart, starting empty: {e}");
                Cart::new()
            }
        };
        Self {
            cart,
            catalog,
            store,
        }
    }

    /// Look the product up in the catalog and add one unit of it,
    /// snapshotting its current price. Persists the cart afterwards.
    pub fn add_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let product = self
            .catalog
            .find(product_id)?
            .ok_or_else(|| CartError::ProductNotFound(product_id.to_string()))?;
        self.cart.add(&product);
        self.persist();
        Ok(())
    }

    /// Adjust a line's quantity by `delta`; zero or below removes the
    /// line. Unknown product ids are a no-op.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) {
        self.cart.change_quantity(product_id, delta);
        self.persist();
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.cart.remove(product_id);
        self.persist();
    }

    /// Empty the cart and persist the empty state. Called exactly once
    /// per checkout, after order completion.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    pub fn total(&self) -> i64 {
        self.cart.total()
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn unit_count(&self) -> u32 {
        self.cart.unit_count()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.cart.lines()) {
            log::error!("Failed to persist cart snapshot: {e}");
        }
    }
}
