use std::sync::Arc;

use crate::entities::{Cart, CartOwner};
use crate::errors::CartError;
use crate::repositories::{DurableCartStore, GuestCartStore, Notice, Notifier};

/// Merge runs exactly once per anonymous-to-authenticated transition;
/// the state guards against re-entry while a merge is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Idle,
    Merging,
}

/// Result of a login merge attempt.
///
/// `persisted` is false when the durable save failed: `cart` then holds
/// the last known durable cart and the guest tier was left untouched so
/// the next eligible login re-runs the merge from intact data.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub cart: Cart,
    pub persisted: bool,
}

/// Combine two independently-evolved carts on shared ids by summing their
/// quantities; ids present on only one side carry over unchanged. An empty
/// guest cart makes the merge an identity on the account cart.
///
/// The sum is intentionally not reclamped to current stock here; a later
/// validation pass corrects totals that exceed it.
pub fn merge_carts(guest: &Cart, account: &Cart) -> Cart {
    if guest.is_empty() {
        return account.clone();
    }

    let mut merged = account.clone();
    for item in guest.iter() {
        if !merged.add_quantity(&item.id, item.quantity) {
            merged.insert(item.clone());
        }
    }
    merged
}

/// One-shot reconciliation of the guest and durable carts at login.
pub struct MergeService {
    guest_store: Arc<dyn GuestCartStore>,
    durable_store: Arc<dyn DurableCartStore>,
    notifier: Arc<dyn Notifier>,
    state: MergeState,
}

impl MergeService {
    pub fn new(
        guest_store: Arc<dyn GuestCartStore>,
        durable_store: Arc<dyn DurableCartStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            guest_store,
            durable_store,
            notifier,
            state: MergeState::Idle,
        }
    }

    pub fn state(&self) -> MergeState {
        self.state
    }

    /// Run the login merge for `owner`.
    ///
    /// The guest tier is cleared only after the merged cart has been
    /// confirmed persisted; on save failure it stays intact and the
    /// outcome falls back to the durable cart. A durable load failure
    /// propagates as an error, also leaving the guest tier untouched.
    pub async fn merge_on_login(&mut self, owner: &CartOwner) -> Result<MergeOutcome, CartError> {
        if self.state == MergeState::Merging {
            return Err(CartError::MergeError("merge already in progress".to_string()));
        }
        self.state = MergeState::Merging;

        let result = self.run_merge(owner).await;

        self.state = MergeState::Idle;
        result
    }

    async fn run_merge(&self, owner: &CartOwner) -> Result<MergeOutcome, CartError> {
        let guest_cart = self.guest_store.load();
        let durable_cart = self.durable_store.load(owner).await?;

        if guest_cart.is_empty() {
            return Ok(MergeOutcome {
                cart: durable_cart,
                persisted: true,
            });
        }

        let merged = merge_carts(&guest_cart, &durable_cart);

        match self.durable_store.save(owner, &merged).await {
            Ok(()) => {
                self.guest_store.clear();
                tracing::info!(items = merged.len(), "guest cart merged into account cart");
                Ok(MergeOutcome {
                    cart: merged,
                    persisted: true,
                })
            }
            Err(error) => {
                tracing::warn!(%error, "merge save failed, guest cart preserved");
                self.notifier.report(Notice::Failure(format!(
                    "Could not sync your cart: {error}"
                )));
                Ok(MergeOutcome {
                    cart: durable_cart,
                    persisted: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BilingualText, CartItem, MeasurementUnit};

    fn item(id: &str, quantity: f64) -> CartItem {
        CartItem {
            id: id.to_string(),
            category_id: "c1".to_string(),
            category_name: BilingualText::new("Fruit", "فواكه").unwrap(),
            name: BilingualText::new(id, id).unwrap(),
            image: String::new(),
            points: 1.0,
            price: 2.5,
            measurement_unit: MeasurementUnit::Weight,
            quantity,
            stock: 10.0,
        }
    }

    #[test]
    fn merge_sums_quantities_on_shared_ids() {
        let guest = Cart::from_items(vec![item("x", 1.5)]);
        let account = Cart::from_items(vec![item("x", 0.75), item("y", 2.0)]);

        let merged = merge_carts(&guest, &account);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("x").unwrap().quantity, 2.25);
        assert_eq!(merged.get("y").unwrap().quantity, 2.0);
    }

    #[test]
    fn merge_with_empty_guest_is_identity() {
        let guest = Cart::new();
        let account = Cart::from_items(vec![item("x", 0.75), item("y", 2.0)]);

        assert_eq!(merge_carts(&guest, &account), account);
    }

    #[test]
    fn merge_appends_guest_only_items() {
        let guest = Cart::from_items(vec![item("z", 0.5)]);
        let account = Cart::from_items(vec![item("y", 2.0)]);

        let merged = merge_carts(&guest, &account);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("z").unwrap().quantity, 0.5);
    }

    #[test]
    fn merge_does_not_reclamp_the_sum_to_stock() {
        // stock snapshot is 10, the summed quantity may exceed it
        let guest = Cart::from_items(vec![item("x", 8.0)]);
        let account = Cart::from_items(vec![item("x", 6.0)]);

        let merged = merge_carts(&guest, &account);

        assert_eq!(merged.get("x").unwrap().quantity, 14.0);
    }
}
