use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::StoreError;
use crate::domain::order::{Order, OrderItem, OrderStatus, PaymentStatus};
use crate::domain::payment::PaymentMethod;
use crate::domain::product::Product;

fn default_true() -> bool {
    true
}

/// On-disk product document. Field names match the upstream catalog
/// collection, including the document-store id key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductDoc {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            category: p.category,
            images: p.images,
            sizes: p.sizes,
            colors: p.colors,
            in_stock: p.in_stock,
            featured: p.featured,
            created_at: p.created_at,
        }
    }
}

impl From<ProductDoc> for Product {
    fn from(d: ProductDoc) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            price: d.price,
            category: d.category,
            images: d.images,
            sizes: d.sizes,
            colors: d.colors,
            in_stock: d.in_stock,
            featured: d.featured,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDoc {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&CartLine> for CartLineDoc {
    fn from(l: &CartLine) -> Self {
        Self {
            product_id: l.product_id.clone(),
            name: l.name.clone(),
            price: l.unit_price,
            quantity: l.quantity,
            size: l.size.clone(),
            color: l.color.clone(),
        }
    }
}

impl From<CartLineDoc> for CartLine {
    fn from(d: CartLineDoc) -> Self {
        Self {
            product_id: d.product_id,
            name: d.name,
            unit_price: d.price,
            quantity: d.quantity,
            size: d.size,
            color: d.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDoc {
    pub product_id: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Persisted order record; field names are the stable wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDoc {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItemDoc>,
    pub total_amount: i64,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub order_date: DateTime<Utc>,
}

impl From<&Order> for OrderDoc {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id,
            customer_name: o.customer_name.clone(),
            customer_email: o.customer_email.clone(),
            customer_phone: o.customer_phone.clone(),
            customer_address: o.customer_address.clone(),
            items: o
                .items
                .iter()
                .map(|i| OrderItemDoc {
                    product_id: i.product_id.clone(),
                    name: i.name.clone(),
                    price: i.price,
                    quantity: i.quantity,
                    size: i.size.clone(),
                    color: i.color.clone(),
                })
                .collect(),
            total_amount: o.total_amount,
            status: o.status.as_str().to_string(),
            payment_method: o.payment_method.as_str().to_string(),
            payment_status: o.payment_status.as_str().to_string(),
            order_date: o.order_date,
        }
    }
}

impl TryFrom<OrderDoc> for Order {
    type Error = StoreError;

    fn try_from(d: OrderDoc) -> Result<Self, StoreError> {
        let payment_method = PaymentMethod::parse(&d.payment_method)
            .map_err(|_| StoreError(format!("unknown payment method '{}'", d.payment_method)))?;
        Ok(Self {
            id: d.id,
            customer_name: d.customer_name,
            customer_email: d.customer_email,
            customer_phone: d.customer_phone,
            customer_address: d.customer_address,
            items: d
                .items
                .into_iter()
                .map(|i| OrderItem {
                    product_id: i.product_id,
                    name: i.name,
                    price: i.price,
                    quantity: i.quantity,
                    size: i.size,
                    color: i.color,
                })
                .collect(),
            total_amount: d.total_amount,
            status: if d.status == "confirmed" {
                OrderStatus::Confirmed
            } else {
                OrderStatus::Pending
            },
            payment_method,
            payment_status: if d.payment_status == "completed" {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Pending
            },
            order_date: d.order_date,
        })
    }
}
