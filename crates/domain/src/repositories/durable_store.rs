use async_trait::async_trait;

use crate::entities::{Cart, CartOwner};
use crate::errors::CartError;

/// Durable per-account cart tier backed by the remote store.
///
/// Saves have full-replace semantics: every save overwrites the entire
/// remote item list for the owner. Callers are responsible for never
/// issuing two saves concurrently for the same owner.
#[async_trait]
pub trait DurableCartStore: Send + Sync {
    /// Fails with [`CartError::MissingUserId`] when the owner carries no
    /// account id.
    async fn load(&self, owner: &CartOwner) -> Result<Cart, CartError>;

    /// Acknowledged save with a bounded timeout. Failures are classified
    /// (timeout / server / network) and never retried automatically.
    async fn save(&self, owner: &CartOwner, cart: &Cart) -> Result<(), CartError>;

    /// Fire-and-forget save for page teardown. Nothing is awaited and no
    /// acknowledgement exists. Returns false when the write could not even
    /// be dispatched, in which case the caller falls back to the recovery
    /// slot in local storage.
    fn save_best_effort(&self, owner: &CartOwner, cart: &Cart) -> bool;
}
