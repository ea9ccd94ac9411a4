//! `PostgreSQL` product catalog.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use curbside_core::{Price, ProductId};

use super::{PgStore, ProductCatalog, RepositoryError};
use crate::models::Product;

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    image_url: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            image_url: row.image_url,
        })
    }
}

#[async_trait]
impl ProductCatalog for PgStore {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();

        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, image_url FROM products WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO products (id, name, price, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                price = EXCLUDED.price,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            ",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.image_url.as_deref())
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use secrecy::SecretString;

    use super::*;
    use crate::db::create_pool;

    async fn store() -> PgStore {
        let url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap();
        PgStore::new(create_pool(&SecretString::from(url)).await.unwrap())
    }

    #[test]
    fn test_negative_price_row_is_corruption() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Broken".to_string(),
            price: Decimal::from_str("-0.01").unwrap(),
            image_url: None,
        };

        assert!(matches!(
            Product::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database"]
    async fn test_upsert_and_find_keep_exact_price() {
        let store = store().await;
        let mut product = Product {
            id: ProductId::generate(),
            name: "Saffron Rice".to_string(),
            price: Price::new(Decimal::from_str("12345678.123456789").unwrap()).unwrap(),
            image_url: Some("/images/rice.jpg".to_string()),
        };

        store.upsert(&product).await.unwrap();
        let found = store.find_by_ids(&[product.id]).await.unwrap();
        assert_eq!(found, vec![product.clone()]);

        product.price = Price::from_cents(499).unwrap();
        store.upsert(&product).await.unwrap();
        let found = store.find_by_ids(&[product.id]).await.unwrap();
        assert_eq!(found.first().unwrap().price, product.price);
    }

    #[tokio::test]
    #[ignore = "Requires a running PostgreSQL database"]
    async fn test_unknown_ids_are_omitted() {
        let store = store().await;

        let found = store.find_by_ids(&[ProductId::generate()]).await.unwrap();

        assert!(found.is_empty());
    }
}
