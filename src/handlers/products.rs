use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::product::Product;
use crate::errors::AppError;
use crate::infrastructure::json_store::demo_catalog;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub in_stock: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
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

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Whole currency units, e.g. 3499
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/products
///
/// Returns every product in the catalog. When the catalog store is
/// unreachable the built-in demo catalog is served instead, so browsing
/// keeps working.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn get_products(state: web::Data<AppState>) -> HttpResponse {
    let products = match state.catalog.list(None) {
        Ok(products) => products,
        Err(e) => {
            log::warn!("Catalog unavailable, serving demo products: {e}");
            demo_catalog()
        }
    };
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    HttpResponse::Ok().json(body)
}

/// GET /api/products/category/{category}
///
/// Products in one category; an unreachable store yields an empty list.
#[utoipa::path(
    get,
    path = "/api/products/category/{category}",
    params(("category" = String, Path, description = "Category label")),
    responses(
        (status = 200, description = "Products in the category", body = [ProductResponse]),
    ),
    tag = "products"
)]
pub async fn get_products_by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let category = path.into_inner();
    let products = state.catalog.list(Some(&category)).unwrap_or_else(|e| {
        log::warn!("Catalog unavailable for category '{category}': {e}");
        Vec::new()
    });
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    HttpResponse::Ok().json(body)
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match state.catalog.find(&id)? {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound),
    }
}

/// POST /api/products
///
/// Adds a product to the catalog.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product"),
    ),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.price < 0 {
        return Err(AppError::Invalid("price must not be negative".to_string()));
    }
    if body.name.trim().is_empty() || body.category.trim().is_empty() {
        return Err(AppError::Invalid("name and category are required".to_string()));
    }

    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        description: body.description,
        price: body.price,
        category: body.category,
        images: body.images,
        sizes: body.sizes,
        colors: body.colors,
        in_stock: true,
        featured: false,
        created_at: Utc::now(),
    };
    state.catalog.insert(product.clone())?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}
