//! Application state shared across handlers.

use std::sync::Arc;

use crate::domain::value_objects::UserId;
use crate::middleware::TokenVerifier;
use crate::payment::{PaymentGateway, SignatureVerifier};
use crate::publisher::EventPublisher;
use crate::storage::Stores;

/// Cheaply cloneable; every collaborator is built once in `main`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    gateway: Arc<dyn PaymentGateway>,
    signatures: SignatureVerifier,
    token_verifier: Arc<dyn TokenVerifier>,
    publisher: EventPublisher,
    catalog_owner: Option<UserId>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        gateway: Arc<dyn PaymentGateway>,
        signatures: SignatureVerifier,
        token_verifier: Arc<dyn TokenVerifier>,
        publisher: EventPublisher,
        catalog_owner: Option<UserId>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                stores,
                gateway,
                signatures,
                token_verifier,
                publisher,
                catalog_owner,
            }),
        }
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    #[must_use]
    pub fn signatures(&self) -> &SignatureVerifier {
        &self.inner.signatures
    }

    #[must_use]
    pub fn token_verifier(&self) -> &dyn TokenVerifier {
        self.inner.token_verifier.as_ref()
    }

    #[must_use]
    pub fn publisher(&self) -> &EventPublisher {
        &self.inner.publisher
    }

    /// The only user allowed to create catalog products.
    #[must_use]
    pub fn catalog_owner(&self) -> Option<UserId> {
        self.inner.catalog_owner
    }
}
