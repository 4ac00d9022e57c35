use crate::entities::{Cart, RecoveryRecord};

/// Ephemeral, browser-scoped guest cart tier.
///
/// All operations are synchronous: the backing store is local key/value
/// storage, so a teardown flush can complete inside an unload handler.
/// Implementations never fail toward the caller; corrupt or unreadable
/// data is logged and treated as an empty cart.
pub trait GuestCartStore: Send + Sync {
    fn load(&self) -> Cart;

    fn save(&self, cart: &Cart);

    fn clear(&self);

    /// Write the last-resort recovery slot used when a best-effort durable
    /// flush cannot be dispatched.
    fn save_recovery(&self, record: &RecoveryRecord);

    /// Read and remove the recovery slot, if present.
    fn take_recovery(&self) -> Option<RecoveryRecord>;
}
