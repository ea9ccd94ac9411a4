//! Catalog products.

use serde::Serialize;

use curbside_core::{Price, ProductId};

/// A product as the catalog currently lists it.
///
/// The catalog owns this record; checkout only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: Price,
    /// Optional image reference.
    pub image_url: Option<String>,
}
