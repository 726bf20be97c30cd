use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::CartLine;
use super::checkout::CheckoutDetails;
use super::payment::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
        }
    }
}

/// One purchased line, copied out of the cart at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
            size: line.size.clone(),
            color: line.color.clone(),
        }
    }
}

/// A persisted order record. Built only after successful payment
/// verification; the items are an independent snapshot of the cart, not
/// a live reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_date: DateTime<Utc>,
}

impl Order {
    /// Assemble an order from a completed checkout. Status fields start
    /// at their wire defaults (`pending`/`pending`); the submitter marks
    /// them confirmed/completed once payment has been verified.
    pub fn from_checkout(
        details: &CheckoutDetails,
        lines: &[CartLine],
        payment_method: PaymentMethod,
        total_amount: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_name: details.full_name(),
            customer_email: details.email.clone(),
            customer_phone: details.phone.clone(),
            customer_address: details.address.clone(),
            items: lines.iter().map(OrderItem::from).collect(),
            total_amount,
            status: OrderStatus::Pending,
            payment_method,
            payment_status: PaymentStatus::Pending,
            order_date: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::Cart;
    use crate::domain::product::Product;

    #[test]
    fn from_checkout_snapshots_cart_lines() {
        let details = CheckoutDetails {
            first_name: "Asha".into(),
            last_name: "Patil".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            address: "12 MG Road, Pune".into(),
        };
        let mut cart = Cart::new();
        cart.add(&Product::new("1", "Navy Blue Silk Kurta", 3499));
        let order = Order::from_checkout(
            &details,
            cart.lines(),
            PaymentMethod::Upi,
            cart.total(),
            Utc::now(),
        );

        // Mutating the cart afterwards must not touch the order.
        cart.clear();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, "1");
        assert_eq!(order.items[0].price, 3499);
        assert_eq!(order.total_amount, 3499);
        assert_eq!(order.customer_name, "Asha Patil");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }
}
