use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::StoreError;
use crate::domain::order::Order;
use crate::domain::ports::{CartStore, CatalogStore, OrderStore};
use crate::domain::product::Product;

use super::models::{CartLineDoc, OrderDoc, ProductDoc};

const PRODUCTS_FILE: &str = "products.json";
const ORDERS_FILE: &str = "orders.json";
const CART_FILE: &str = "cart.json";

#[derive(Default)]
struct Collections {
    products: Vec<ProductDoc>,
    orders: Vec<OrderDoc>,
    cart: Vec<CartLineDoc>,
}

/// Document store backed by one JSON file per collection under a data
/// directory. Every mutation rewrites the collection through a
/// temp-file rename, so a reader never observes a partial write.
pub struct JsonDocumentStore {
    dir: PathBuf,
    state: Mutex<Collections>,
}

impl JsonDocumentStore {
    /// Open (or create) the data directory and load all collections.
    /// An absent products collection is seeded with the demo catalog.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError(e.to_string()))?;

        let store = Self {
            state: Mutex::new(Collections {
                products: read_collection(&dir.join(PRODUCTS_FILE))?,
                orders: read_collection(&dir.join(ORDERS_FILE))?,
                cart: read_collection(&dir.join(CART_FILE))?,
            }),
            dir,
        };

        {
            let mut state = store.lock()?;
            if state.products.is_empty() {
                log::info!("Products collection empty, seeding demo catalog");
                state.products = demo_catalog().into_iter().map(ProductDoc::from).collect();
                store.persist(PRODUCTS_FILE, &state.products)?;
            }
        }
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError("store lock poisoned".into()))
    }

    fn persist<T: Serialize>(&self, file: &str, docs: &[T]) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let bytes = serde_json::to_vec_pretty(docs).map_err(|e| StoreError(e.to_string()))?;
        fs::write(&tmp, bytes).map_err(|e| StoreError(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError(e.to_string()))?;
        Ok(())
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).map_err(|e| StoreError(e.to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| StoreError(format!("corrupt collection {}: {e}", path.display())))
}

impl CatalogStore for JsonDocumentStore {
    fn find(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(Product::from))
    }

    fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .map(Product::from)
            .collect())
    }

    fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.products.push(ProductDoc::from(product));
        self.persist(PRODUCTS_FILE, &state.products)
    }
}

impl CartStore for JsonDocumentStore {
    fn save(&self, lines: &[CartLine]) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.cart = lines.iter().map(CartLineDoc::from).collect();
        self.persist(CART_FILE, &state.cart)
    }

    fn load(&self) -> Result<Vec<CartLine>, StoreError> {
        let state = self.lock()?;
        Ok(state.cart.iter().cloned().map(CartLine::from).collect())
    }
}

impl OrderStore for JsonDocumentStore {
    fn save(&self, order: &Order) -> Result<Uuid, StoreError> {
        let mut state = self.lock()?;
        state.orders.push(OrderDoc::from(order));
        self.persist(ORDERS_FILE, &state.orders)?;
        Ok(order.id)
    }

    fn list(&self) -> Result<Vec<Order>, StoreError> {
        let state = self.lock()?;
        let mut orders = state
            .orders
            .iter()
            .cloned()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }
}

/// Built-in catalog served when no products have been loaded yet, so a
/// fresh install can be browsed end to end.
pub fn demo_catalog() -> Vec<Product> {
    let entries: [(&str, &str, &str, i64, &str, &str, &[&str], &[&str]); 6] = [
        (
            "1",
            "Navy Blue Silk Kurta",
            "Premium silk kurta with traditional embroidery",
            3499,
            "kurtas",
            "/uploads/kurta1.jpg",
            &["S", "M", "L", "XL"],
            &["Navy Blue"],
        ),
        (
            "2",
            "White Chikan Kurta",
            "Handcrafted chikan work on premium cotton",
            5899,
            "kurtas",
            "/uploads/kurta2.jpg",
            &["S", "M", "L", "XL"],
            &["White", "Off-White"],
        ),
        (
            "3",
            "Royal Maroon Sherwani",
            "Regal sherwani with golden embroidery for weddings",
            10999,
            "sherwanis",
            "/uploads/shervani.jpg",
            &["M", "L", "XL", "XXL"],
            &["Maroon", "Red"],
        ),
        (
            "4",
            "Designer Indo-Western Suit",
            "Contemporary fusion wear with traditional touch",
            15399,
            "modern",
            "/uploads/Indowestern.jpg",
            &["S", "M", "L", "XL"],
            &["Black", "Grey", "Navy"],
        ),
        (
            "5",
            "Traditional Dhoti Kurta Set",
            "Complete traditional attire for festivals",
            4599,
            "traditional",
            "/uploads/dhotikurta.jpg",
            &["M", "L", "XL"],
            &["White", "Cream"],
        ),
        (
            "6",
            "Embroidered Jodhpuri Suit",
            "Classic Jodhpuri style with intricate embroidery",
            14999,
            "modern",
            "/uploads/jodhpuri.jpg",
            &["S", "M", "L", "XL"],
            &["Blue", "Black"],
        ),
    ];

    entries
        .into_iter()
        .map(
            |(id, name, description, price, category, image, sizes, colors)| {
                let mut p = Product::new(id, name, price);
                p.description = description.to_string();
                p.category = category.to_string();
                p.images = vec![image.to_string()];
                p.sizes = sizes.iter().map(|s| s.to_string()).collect();
                p.colors = colors.iter().map(|s| s.to_string()).collect();
                p
            },
        )
        .collect()
}
