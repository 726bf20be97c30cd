use super::product::Product;

/// One product-id + quantity entry within a cart. Name, price, size and
/// color are snapshots taken when the line was created; later catalog
/// edits do not affect them.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Ordered sequence of cart lines, at most one line per product id.
/// Lines never hold a quantity below 1; a decrement to zero removes the
/// line entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a cart from a persisted snapshot. Lines that violate the
    /// invariants (zero quantity, duplicate product id) are dropped
    /// rather than propagated.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 || cart.line(&line.product_id).is_some() {
                continue;
            }
            cart.lines.push(line);
        }
        cart
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines (the cart-count badge).
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Increment the line for `product` by one, or append a fresh line
    /// with quantity 1, snapshotting the product's current price.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            size: product.sizes.first().cloned(),
            color: product.colors.first().cloned(),
        });
    }

    /// Add `delta` to the line's quantity; a result of zero or less
    /// removes the line. No-op when the product is not in the cart.
    pub fn change_quantity(&mut self, product_id: &str, delta: i64) {
        let Some(idx) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return;
        };
        let updated = i64::from(self.lines[idx].quantity) + delta;
        if updated <= 0 {
            self.lines.remove(idx);
        } else {
            self.lines[idx].quantity = updated as u32;
        }
    }

    /// Delete the line if present; no-op otherwise.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Sum of unit price × quantity over all lines; 0 for an empty cart.
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.unit_price * i64::from(l.quantity))
            .sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
