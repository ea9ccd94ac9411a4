//! Cart and address book.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use curbside_core::{
    AddressError, CartEntry, ProductId, Quantity, SavedAddress, SavedAddressInput, UserId,
};

use super::validation::{CartInputError, CartLineInput, ValidationErrors, validate_cart};
use crate::db::{ProductCatalog, RepositoryError, UserRepository};
use crate::models::Product;

/// Errors from account updates.
#[derive(Debug, Error)]
pub enum AccountError {
    /// A cart line failed validation.
    #[error("invalid cart: {0}")]
    Validation(#[from] ValidationErrors),

    /// A cart line names a product id that cannot exist.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// An address is incomplete, or more than one is the default.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<CartInputError> for AccountError {
    fn from(e: CartInputError) -> Self {
        match e {
            CartInputError::Validation(errors) => Self::Validation(errors),
            CartInputError::UnknownProduct(id) => Self::ProductNotFound(id),
        }
    }
}

/// A stored cart entry with its product attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Referenced product.
    pub product_id: ProductId,
    /// Requested count.
    pub quantity: Quantity,
    /// The current catalog entry, or `None` if it has been removed.
    pub product: Option<Product>,
}

/// Account service.
pub struct AccountService<'a> {
    users: &'a dyn UserRepository,
    catalog: &'a dyn ProductCatalog,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository, catalog: &'a dyn ProductCatalog) -> Self {
        Self { users, catalog }
    }

    /// The user's stored cart with current product data.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the user is gone or storage fails.
    pub async fn cart(&self, user: UserId) -> Result<Vec<CartLine>, AccountError> {
        let user = self
            .users
            .find_by_id(user)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.populate(user.cart).await
    }

    /// Replace the user's cart and return it populated.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` naming every line with a quantity
    /// below 1, or `AccountError::ProductNotFound` for a malformed product id.
    /// Nothing is written in either case.
    pub async fn replace_cart(
        &self,
        user: UserId,
        lines: &[CartLineInput],
    ) -> Result<Vec<CartLine>, AccountError> {
        let entries = validate_cart(lines)?;
        let stored = self.users.replace_cart(user, &entries).await?;
        tracing::debug!(user_id = %user, lines = stored.len(), "Cart replaced");
        self.populate(stored).await
    }

    /// Replace the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidAddress` if any entry is incomplete or
    /// more than one is marked default.
    pub async fn replace_addresses(
        &self,
        user: UserId,
        inputs: Vec<SavedAddressInput>,
    ) -> Result<Vec<SavedAddress>, AccountError> {
        let book = SavedAddress::validate_book(inputs)?;
        let stored = self.users.replace_addresses(user, &book).await?;
        tracing::debug!(user_id = %user, addresses = stored.len(), "Addresses replaced");
        Ok(stored)
    }

    async fn populate(
        &self,
        entries: Vec<CartEntry>,
    ) -> Result<Vec<CartLine>, AccountError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<ProductId> = entries.iter().map(|e| e.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products: HashMap<ProductId, Product> = self
            .catalog
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| CartLine {
                product_id: entry.product_id,
                quantity: entry.quantity,
                product: products.get(&entry.product_id).cloned(),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use curbside_core::{AddressInput, Email, Price};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewUser, User};

    async fn user(store: &MemoryStore) -> User {
        UserRepository::create(
            store,
            NewUser {
                name: "Ada".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                password_hash: "$argon2id$v=19$placeholder".to_string(),
                is_admin: false,
            },
        )
        .await
        .unwrap()
    }

    fn saved(street: &str, default: bool) -> SavedAddressInput {
        SavedAddressInput {
            address: AddressInput {
                street: Some(street.to_string()),
                city: Some("Springfield".to_string()),
                state: Some("IL".to_string()),
                zip: Some("62701".to_string()),
            },
            default,
        }
    }

    #[tokio::test]
    async fn test_cart_replace_and_view() {
        let store = MemoryStore::new();
        let owner = user(&store).await;
        let product = Product {
            id: ProductId::generate(),
            name: "Bao".to_string(),
            price: Price::from_cents(300).unwrap(),
            image_url: Some("/images/bao.jpg".to_string()),
        };
        store.upsert(&product).await.unwrap();
        let vanished = ProductId::generate();

        let account = AccountService::new(&store, &store);
        let lines = [
            CartLineInput {
                product_id: product.id.to_string(),
                quantity: 2,
            },
            CartLineInput {
                product_id: vanished.to_string(),
                quantity: 1,
            },
        ];
        account.replace_cart(owner.id, &lines).await.unwrap();

        let cart = account.cart(owner.id).await.unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0].product.as_ref().unwrap().name, "Bao");
        assert_eq!(cart[0].quantity.get(), 2);
        assert_eq!(cart[1].product_id, vanished);
        assert!(cart[1].product.is_none());
    }

    #[tokio::test]
    async fn test_zero_quantity_leaves_cart_untouched() {
        let store = MemoryStore::new();
        let owner = user(&store).await;
        let account = AccountService::new(&store, &store);

        let err = account
            .replace_cart(
                owner.id,
                &[CartLineInput {
                    product_id: ProductId::generate().to_string(),
                    quantity: 0,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
        assert!(account.cart(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_product_id_leaves_cart_untouched() {
        let store = MemoryStore::new();
        let owner = user(&store).await;
        let account = AccountService::new(&store, &store);

        let err = account
            .replace_cart(
                owner.id,
                &[CartLineInput {
                    product_id: "bao".to_string(),
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::ProductNotFound(id) if id == "bao"));
        assert!(account.cart(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_addresses_replaced_wholesale() {
        let store = MemoryStore::new();
        let owner = user(&store).await;
        let account = AccountService::new(&store, &store);

        account
            .replace_addresses(owner.id, vec![saved("1 Main St", true)])
            .await
            .unwrap();
        let stored = account
            .replace_addresses(
                owner.id,
                vec![saved("2 Oak Ave", false), saved("3 Elm St", true)],
            )
            .await
            .unwrap();

        let streets: Vec<&str> = stored.iter().map(|a| a.address.street()).collect();
        assert_eq!(streets, vec!["2 Oak Ave", "3 Elm St"]);
    }

    #[tokio::test]
    async fn test_two_defaults_rejected() {
        let store = MemoryStore::new();
        let owner = user(&store).await;
        let account = AccountService::new(&store, &store);

        let err = account
            .replace_addresses(owner.id, vec![saved("1 Main St", true), saved("2 Oak", true)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccountError::InvalidAddress(AddressError::MultipleDefaults)
        ));
    }
}
