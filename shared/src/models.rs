//! Product model definitions shared by the catalog lambdas.
//!
use serde::{Deserialize, Serialize};

/// A catalog entry as stored in the products table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
}

/// Stock level for a product, stored in its own table keyed by `product_id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Stock {
    pub product_id: String,
    pub count: f64,
}

/// Body of a product creation request: a product with stock, minus the id,
/// which is assigned on creation. Unknown fields (an `id` coming from an
/// import file, for instance) are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateProductPayload {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub count: f64,
}

impl CreateProductPayload {
    /// Splits the payload into the two items written for a new product.
    pub fn into_items(self, id: String) -> (Product, Stock) {
        let stock = Stock {
            product_id: id.clone(),
            count: self.count,
        };
        let product = Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
        };
        (product, stock)
    }
}
