//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::{HealthCheck, OrderRepository, ProductCatalog, UserRepository};
use crate::services::account::AccountService;
use crate::services::auth::{AuthService, TokenIssuer};
use crate::services::orders::OrderService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories, the token issuer, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    users: Arc<dyn UserRepository>,
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderRepository>,
    health: Arc<dyn HealthCheck>,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state over one store that implements every
    /// repository trait.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - `PgStore` in production, `MemoryStore` in tests
    #[must_use]
    pub fn new<S>(config: StorefrontConfig, store: Arc<S>) -> Self
    where
        S: UserRepository + ProductCatalog + OrderRepository + HealthCheck + 'static,
    {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                users: store.clone(),
                catalog: store.clone(),
                orders: store.clone(),
                health: store,
                tokens,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Account storage.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.users.as_ref()
    }

    /// Authoritative product data.
    #[must_use]
    pub fn catalog(&self) -> &dyn ProductCatalog {
        self.inner.catalog.as_ref()
    }

    /// Order storage.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.orders.as_ref()
    }

    /// Store liveness probe.
    #[must_use]
    pub fn health(&self) -> &dyn HealthCheck {
        self.inner.health.as_ref()
    }

    /// Token signer and verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Authentication service over this state's users and tokens.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.tokens())
    }

    /// Order service using the configured status policy.
    #[must_use]
    pub fn order_service(&self) -> OrderService<'_> {
        OrderService::new(
            self.orders(),
            self.users(),
            self.catalog(),
            self.config().status_policy,
        )
    }

    /// Cart and address-book service.
    #[must_use]
    pub fn account(&self) -> AccountService<'_> {
        AccountService::new(self.users(), self.catalog())
    }
}
