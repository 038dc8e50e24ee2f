use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::products::repo::{DeletedProduct, Product, ProductDetail};

/// Raw listing parameters as they arrive on the query string. Numeric fields
/// are typed (a non-numeric `page` fails extraction with a 400); `category`
/// stays a string because an empty value means "no filter", and `sort` /
/// `order` stay strings because out-of-range values silently fall back
/// instead of failing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub search: String,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Create/update body. Field presence is validated here, not by serde, so
/// the responses carry the contract's messages.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<i32>,
}

/// Payload after validation, ready to persist.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<i32>,
}

impl ProductPayload {
    pub fn validate(self) -> Result<NewProduct, ApiError> {
        let name = match self.name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => return Err(ApiError::validation("Name and price are required")),
        };
        let price = match self.price {
            Some(price) => price,
            None => return Err(ApiError::validation("Name and price are required")),
        };
        if price < Decimal::ZERO {
            return Err(ApiError::validation("Price must be a positive number"));
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err(ApiError::validation("Stock must be a non-negative number"));
            }
        }
        Ok(NewProduct {
            name,
            // An empty description is stored as NULL, matching the original
            // contract.
            description: self.description.filter(|d| !d.is_empty()),
            price,
            stock: self.stock.unwrap_or(0),
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductDetail>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub product: ProductDetail,
}

#[derive(Debug, Serialize)]
pub struct ProductMutationResponse {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ProductDeleteResponse {
    pub message: String,
    pub product: DeletedProduct,
}
