use chrono::{DateTime, Utc};

/// A catalog document. Immutable once loaded from the catalog store;
/// cart lines snapshot the fields they need rather than holding a
/// reference back into the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Whole currency units, never negative.
    pub price: i64,
    pub category: String,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            category: String::new(),
            images: Vec::new(),
            sizes: Vec::new(),
            colors: Vec::new(),
            in_stock: true,
            featured: false,
            created_at: Utc::now(),
        }
    }
}
