//! Cart pricing.
//!
//! Turns `{productId, quantity}` pairs into priced, name-snapshotted line
//! items. The catalog is the only source of names and prices; nothing the
//! client sent besides the product ID and quantity is consulted.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use curbside_core::{CartEntry, PriceError, ProductId};

use crate::db::{ProductCatalog, RepositoryError};
use crate::models::{OrderLineItem, PricedCart, Product};

/// Errors from pricing a cart.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Nothing to price.
    #[error("no items in cart")]
    EmptyCart,

    /// A cart entry names a product the catalog does not list.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The total is not representable.
    #[error("price arithmetic failed: {0}")]
    Arithmetic(#[from] PriceError),

    /// The catalog lookup failed.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] RepositoryError),
}

/// Price a cart against the catalog.
///
/// Issues exactly one catalog lookup for the distinct product IDs, then walks
/// the cart in order, accumulating the total in that order. Any unknown
/// product aborts the whole operation.
///
/// # Errors
///
/// Returns `PricingError::EmptyCart` for an empty cart and
/// `PricingError::ProductNotFound` naming the first unknown product.
pub async fn price_cart(
    entries: &[CartEntry],
    catalog: &dyn ProductCatalog,
) -> Result<PricedCart, PricingError> {
    if entries.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    let ids: Vec<ProductId> = entries
        .iter()
        .map(|entry| entry.product_id)
        .filter(|id| seen.insert(*id))
        .collect();

    let products: HashMap<ProductId, Product> = catalog
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let items = entries
        .iter()
        .map(|entry| {
            let product = products
                .get(&entry.product_id)
                .ok_or(PricingError::ProductNotFound(entry.product_id))?;

            Ok(OrderLineItem {
                product_id: product.id,
                name: product.name.clone(),
                quantity: entry.quantity,
                price: product.price,
            })
        })
        .collect::<Result<Vec<_>, PricingError>>()?;

    Ok(PricedCart::from_line_items(items)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use curbside_core::{Price, Quantity};

    use super::*;
    use crate::db::MemoryStore;

    fn product(name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Price::from_cents(cents).unwrap(),
            image_url: None,
        }
    }

    fn entry(product: &Product, quantity: u32) -> CartEntry {
        CartEntry::new(product.id, Quantity::new(quantity).unwrap())
    }

    /// Wraps a store and counts catalog round trips.
    struct CountingCatalog {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProductCatalog for CountingCatalog {
        async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_ids(ids).await
        }

        async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
            self.inner.upsert(product).await
        }
    }

    #[tokio::test]
    async fn test_single_line_scenario() {
        let store = MemoryStore::new();
        let p1 = product("Pad Thai", 950);
        store.upsert(&p1).await.unwrap();

        let priced = price_cart(&[entry(&p1, 2)], &store).await.unwrap();

        assert_eq!(priced.total(), Price::from_cents(1900).unwrap());
        assert_eq!(priced.items().len(), 1);
        let item = &priced.items()[0];
        assert_eq!(item.product_id, p1.id);
        assert_eq!(item.name, "Pad Thai");
        assert_eq!(item.quantity.get(), 2);
        assert_eq!(item.price, Price::from_cents(950).unwrap());
    }

    #[tokio::test]
    async fn test_total_is_sum_over_lines() {
        let store = MemoryStore::new();
        let a = product("A", 333);
        let b = product("B", 1);
        store.upsert(&a).await.unwrap();
        store.upsert(&b).await.unwrap();

        let priced = price_cart(&[entry(&a, 3), entry(&b, 7), entry(&a, 1)], &store)
            .await
            .unwrap();

        assert_eq!(priced.total().amount(), Decimal::new(1339, 2));
        let names: Vec<&str> = priced.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "A"]);
    }

    #[tokio::test]
    async fn test_unknown_product_aborts() {
        let store = MemoryStore::new();
        let known = product("Known", 100);
        store.upsert(&known).await.unwrap();
        let missing = ProductId::generate();

        let cart = [
            entry(&known, 1),
            CartEntry::new(missing, Quantity::new(1).unwrap()),
        ];
        let err = price_cart(&cart, &store).await.unwrap_err();

        assert!(matches!(err, PricingError::ProductNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let store = MemoryStore::new();
        let err = price_cart(&[], &store).await.unwrap_err();
        assert!(matches!(err, PricingError::EmptyCart));
    }

    #[tokio::test]
    async fn test_one_lookup_for_repeated_products() {
        let catalog = CountingCatalog {
            inner: MemoryStore::new(),
            calls: AtomicUsize::new(0),
        };
        let p = product("Dumplings", 600);
        catalog.upsert(&p).await.unwrap();

        price_cart(&[entry(&p, 1), entry(&p, 2), entry(&p, 3)], &catalog)
            .await
            .unwrap();

        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_later_catalog_change_does_not_touch_priced_items() {
        let store = MemoryStore::new();
        let mut p = product("Soup", 450);
        store.upsert(&p).await.unwrap();

        let priced = price_cart(&[entry(&p, 2)], &store).await.unwrap();

        p.name = "Renamed Soup".to_string();
        p.price = Price::from_cents(9999).unwrap();
        store.upsert(&p).await.unwrap();

        assert_eq!(priced.items()[0].name, "Soup");
        assert_eq!(priced.total(), Price::from_cents(900).unwrap());
    }
}
