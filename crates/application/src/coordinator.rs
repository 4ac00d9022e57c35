use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use domain::{
    Cart, CartError, CartItem, CartOperations, CartOwner, DurableCartStore, GuestCartStore,
    Identity, MergeService, MutationOutcome, Notice, Notifier, RecoveryRecord,
};

/// Lifecycle of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    Uninitialized,
    Loading,
    GuestReady,
    AccountReady,
    Merging,
    Clearing,
}

/// Point-in-time view of the coordinator's cart, for callers and tests.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub state: CartState,
    pub items: Vec<CartItem>,
    pub dirty: bool,
}

type MutationReply = oneshot::Sender<Result<MutationOutcome, CartError>>;

pub enum CartCommand {
    Add { item: CartItem, reply: MutationReply },
    Increase { id: String, reply: MutationReply },
    Decrease { id: String, reply: MutationReply },
    SetQuantity { id: String, raw: f64, reply: MutationReply },
    Remove { id: String, reply: MutationReply },
    Clear { reply: MutationReply },
    IdentityChanged(Identity),
    Flush,
    Snapshot(oneshot::Sender<CartSnapshot>),
    Teardown(oneshot::Sender<()>),
    // Completion signal from a spawned durable save task. Carries the
    // owner the save was issued for so a settle after an identity switch
    // can be told apart from one for the current owner.
    SaveSettled {
        owner: CartOwner,
        result: Result<(), CartError>,
    },
}

/// Client side of the coordinator channel.
#[derive(Clone)]
pub struct CartHandle {
    tx: mpsc::Sender<CartCommand>,
}

impl CartHandle {
    pub async fn add(&self, item: CartItem) -> Result<MutationOutcome, CartError> {
        self.mutate(|reply| CartCommand::Add { item, reply }).await
    }

    pub async fn increase(&self, id: impl Into<String>) -> Result<MutationOutcome, CartError> {
        let id = id.into();
        self.mutate(|reply| CartCommand::Increase { id, reply }).await
    }

    pub async fn decrease(&self, id: impl Into<String>) -> Result<MutationOutcome, CartError> {
        let id = id.into();
        self.mutate(|reply| CartCommand::Decrease { id, reply }).await
    }

    pub async fn set_quantity(
        &self,
        id: impl Into<String>,
        raw: f64,
    ) -> Result<MutationOutcome, CartError> {
        let id = id.into();
        self.mutate(|reply| CartCommand::SetQuantity { id, raw, reply })
            .await
    }

    pub async fn remove(&self, id: impl Into<String>) -> Result<MutationOutcome, CartError> {
        let id = id.into();
        self.mutate(|reply| CartCommand::Remove { id, reply }).await
    }

    pub async fn clear(&self) -> Result<MutationOutcome, CartError> {
        self.mutate(|reply| CartCommand::Clear { reply }).await
    }

    pub async fn identity_changed(&self, identity: Identity) -> Result<(), CartError> {
        self.tx
            .send(CartCommand::IdentityChanged(identity))
            .await
            .map_err(|_| Self::closed())
    }

    /// Explicitly re-trigger persistence after a failed save.
    pub async fn flush(&self) -> Result<(), CartError> {
        self.tx.send(CartCommand::Flush).await.map_err(|_| Self::closed())
    }

    pub async fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CartCommand::Snapshot(reply))
            .await
            .map_err(|_| Self::closed())?;
        rx.await.map_err(|_| Self::closed())
    }

    /// Page-teardown equivalent: flush best-effort and stop the
    /// coordinator. Resolves once the flush has been dispatched.
    pub async fn teardown(&self) -> Result<(), CartError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CartCommand::Teardown(reply))
            .await
            .map_err(|_| Self::closed())?;
        rx.await.map_err(|_| Self::closed())
    }

    async fn mutate<F>(&self, command: F) -> Result<MutationOutcome, CartError>
    where
        F: FnOnce(MutationReply) -> CartCommand,
    {
        let (reply, rx) = oneshot::channel();
        self.tx.send(command(reply)).await.map_err(|_| Self::closed())?;
        rx.await.map_err(|_| Self::closed())?
    }

    fn closed() -> CartError {
        CartError::StorageError("cart coordinator stopped".to_string())
    }
}

/// Owner of the canonical in-memory cart.
///
/// Runs as a single task; all access goes through the command channel, so
/// mutations, merges, and saves interleave only at await points and the
/// cart itself is never shared. The debounce deadline is a single slot:
/// every accepted mutation overwrites it, which is the cancel-and-
/// reschedule required by the full-replace save semantics. Durable saves
/// run one at a time; a timer that fires mid-save parks in a depth-one
/// pending flag.
pub struct CartCoordinator {
    operations: CartOperations,
    merge: MergeService,
    guest_store: Arc<dyn GuestCartStore>,
    durable_store: Arc<dyn DurableCartStore>,
    notifier: Arc<dyn Notifier>,
    debounce: Duration,
    rx: mpsc::Receiver<CartCommand>,
    internal_tx: mpsc::Sender<CartCommand>,
    cart: Cart,
    dirty: bool,
    identity: Identity,
    state: CartState,
    save_deadline: Option<Instant>,
    save_in_flight: bool,
    save_pending: bool,
}

impl CartCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operations: CartOperations,
        merge: MergeService,
        guest_store: Arc<dyn GuestCartStore>,
        durable_store: Arc<dyn DurableCartStore>,
        notifier: Arc<dyn Notifier>,
        initial_identity: Identity,
        debounce: Duration,
    ) -> (CartHandle, Self) {
        let (tx, rx) = mpsc::channel(64);
        let handle = CartHandle { tx: tx.clone() };

        let coordinator = Self {
            operations,
            merge,
            guest_store,
            durable_store,
            notifier,
            debounce,
            rx,
            internal_tx: tx,
            cart: Cart::new(),
            dirty: false,
            identity: initial_identity,
            state: CartState::Uninitialized,
            save_deadline: None,
            save_in_flight: false,
            save_pending: false,
        };

        (handle, coordinator)
    }

    pub async fn run(mut self) {
        self.boot().await;

        loop {
            let deadline = self.save_deadline;
            tokio::select! {
                maybe_command = self.rx.recv() => {
                    match maybe_command {
                        Some(command) => {
                            if self.handle_command(command).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                    if deadline.is_some() =>
                {
                    self.save_deadline = None;
                    self.trigger_save();
                }
            }
        }
    }

    async fn boot(&mut self) {
        self.state = CartState::Loading;
        match self.identity.owner() {
            CartOwner::Guest => {
                self.cart = self.guest_store.load();
                self.state = CartState::GuestReady;
            }
            owner => {
                self.cart = self.load_durable_with_recovery(&owner).await;
                self.state = CartState::AccountReady;
            }
        }
        tracing::info!(state = ?self.state, items = self.cart.len(), "cart coordinator ready");
    }

    /// Returns true when the coordinator should stop.
    async fn handle_command(&mut self, command: CartCommand) -> bool {
        match command {
            CartCommand::Add { item, reply } => {
                let result = self.operations.add(&mut self.cart, item).await;
                let result = self.after_mutation(result);
                let _ = reply.send(result);
            }
            CartCommand::Increase { id, reply } => {
                let result = self.operations.increase(&mut self.cart, &id);
                let result = self.after_mutation(result);
                let _ = reply.send(result);
            }
            CartCommand::Decrease { id, reply } => {
                let result = self.operations.decrease(&mut self.cart, &id);
                let result = self.after_mutation(result);
                let _ = reply.send(result);
            }
            CartCommand::SetQuantity { id, raw, reply } => {
                let result = self.operations.set_quantity(&mut self.cart, &id, raw).await;
                let result = self.after_mutation(result);
                let _ = reply.send(result);
            }
            CartCommand::Remove { id, reply } => {
                let result = self.operations.remove(&mut self.cart, &id);
                let result = self.after_mutation(result);
                let _ = reply.send(result);
            }
            CartCommand::Clear { reply } => {
                let result = self.operations.clear(&mut self.cart);
                let result = self.after_mutation(result);
                let _ = reply.send(result);
            }
            CartCommand::IdentityChanged(identity) => self.on_identity_changed(identity).await,
            CartCommand::Flush => {
                self.save_deadline = None;
                self.trigger_save();
            }
            CartCommand::Snapshot(reply) => {
                let _ = reply.send(CartSnapshot {
                    state: self.state,
                    items: self.cart.items().to_vec(),
                    dirty: self.dirty,
                });
            }
            CartCommand::Teardown(reply) => {
                self.on_teardown();
                let _ = reply.send(());
                return true;
            }
            CartCommand::SaveSettled { owner, result } => self.on_save_settled(owner, result),
        }
        false
    }

    /// Accepted mutations mark the cart dirty and schedule persistence;
    /// validation rejections travel back to the caller and no further.
    /// Errors (network during an enhanced stock check) additionally go to
    /// the notification channel.
    fn after_mutation(
        &mut self,
        result: Result<MutationOutcome, CartError>,
    ) -> Result<MutationOutcome, CartError> {
        match &result {
            Ok(outcome) if outcome.mutated() => self.mark_dirty(),
            Ok(_) => {}
            Err(error) => {
                self.notifier.report(Notice::Failure(error.to_string()));
            }
        }
        result
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        match self.identity.owner() {
            CartOwner::Guest => {
                // The guest tier is local and synchronous; flush immediately.
                self.guest_store.save(&self.cart);
                self.dirty = false;
            }
            CartOwner::Account { .. } => {
                self.save_deadline = Some(Instant::now() + self.debounce);
            }
        }
    }

    /// Timer-fired (or explicitly requested) persistence. At most one
    /// durable save is in flight; a second trigger parks in the pending
    /// flag until the first one settles.
    fn trigger_save(&mut self) {
        if !self.dirty {
            return;
        }
        if self.save_in_flight {
            self.save_pending = true;
            return;
        }
        self.start_durable_save();
    }

    fn start_durable_save(&mut self) {
        let owner = self.identity.owner();
        if owner.is_guest() {
            self.guest_store.save(&self.cart);
            self.dirty = false;
            return;
        }

        self.save_in_flight = true;
        self.dirty = false;

        let store = Arc::clone(&self.durable_store);
        let snapshot = self.cart.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = store.save(&owner, &snapshot).await;
            let _ = tx.send(CartCommand::SaveSettled { owner, result }).await;
        });
    }

    fn on_save_settled(&mut self, owner: CartOwner, result: Result<(), CartError>) {
        self.save_in_flight = false;

        if owner != self.identity.owner() {
            // Settled after an identity switch; the result concerns the
            // previous owner's tier and no longer affects this cart.
            if let Err(error) = result {
                tracing::warn!(%error, "save for previous owner failed");
            }
            self.save_pending = false;
            return;
        }

        match result {
            Ok(()) => tracing::debug!("debounced cart save confirmed"),
            Err(error) => {
                // Dirty stays set; a later mutation or explicit flush
                // re-triggers. No automatic retry.
                self.dirty = true;
                self.notifier
                    .report(Notice::Failure(format!("Could not save your cart: {error}")));
            }
        }

        if self.save_pending {
            self.save_pending = false;
            if self.dirty {
                self.start_durable_save();
            }
        }
    }

    async fn on_identity_changed(&mut self, next: Identity) {
        if next == self.identity {
            return;
        }

        // Cancel debounced work aimed at the previous owner before the
        // new lifecycle phase starts.
        self.save_deadline = None;
        self.save_pending = false;

        let previous = self.identity.owner();
        self.identity = next;
        let current = self.identity.owner();

        match (previous, current) {
            (CartOwner::Guest, owner @ CartOwner::Account { .. }) => {
                self.on_login(owner).await;
            }
            (CartOwner::Account { .. }, CartOwner::Guest) => {
                self.on_logout();
            }
            (CartOwner::Account { .. }, owner @ CartOwner::Account { .. }) => {
                // Account switch without an intervening logout: treated as
                // logout then login, never a merge.
                self.on_logout();
                self.on_login(owner).await;
            }
            (CartOwner::Guest, CartOwner::Guest) => {}
        }
    }

    async fn on_login(&mut self, owner: CartOwner) {
        let guest_cart = self.guest_store.load();

        if owner.carries_cart() && !guest_cart.is_empty() {
            self.state = CartState::Merging;
            match self.merge.merge_on_login(&owner).await {
                Ok(outcome) => {
                    // On a failed persist this is the last known durable
                    // cart and the guest tier is still intact.
                    self.cart = outcome.cart;
                    self.dirty = false;
                }
                Err(error) => {
                    self.notifier
                        .report(Notice::Failure(format!("Could not load your cart: {error}")));
                    self.cart = Cart::new();
                    self.dirty = false;
                }
            }
        } else {
            // Ineligible role or nothing to carry over: guest remnants are
            // discarded and the durable cart loaded fresh.
            self.guest_store.clear();
            self.cart = self.load_durable_with_recovery(&owner).await;
        }

        self.state = CartState::AccountReady;
    }

    fn on_logout(&mut self) {
        self.state = CartState::Clearing;
        self.cart = Cart::new();
        self.dirty = false;
        self.guest_store.clear();
        self.state = CartState::GuestReady;
    }

    async fn load_durable_with_recovery(&mut self, owner: &CartOwner) -> Cart {
        let mut cart = match self.durable_store.load(owner).await {
            Ok(cart) => cart,
            Err(error) => {
                self.notifier
                    .report(Notice::Failure(format!("Could not load your cart: {error}")));
                Cart::new()
            }
        };

        if let Some(record) = self.guest_store.take_recovery() {
            if Some(record.user_id.as_str()) == owner.user_id() {
                // The recovery snapshot was taken at teardown, after the
                // last acknowledged save; it supersedes the loaded cart
                // and is pushed back out on the next debounce.
                cart = Cart::from_items(record.items);
                self.dirty = true;
                self.save_deadline = Some(Instant::now() + self.debounce);
            } else {
                tracing::warn!("recovery record belongs to a different account, discarded");
            }
        }

        cart
    }

    fn on_teardown(&mut self) {
        if !self.dirty {
            return;
        }

        match self.identity.owner() {
            CartOwner::Guest => {
                // Synchronous flush; completes before the in-memory cart
                // goes away with the task.
                self.guest_store.save(&self.cart);
            }
            owner @ CartOwner::Account { .. } => {
                if !self.durable_store.save_best_effort(&owner, &self.cart) {
                    if let Some(user_id) = owner.user_id() {
                        self.guest_store.save_recovery(&RecoveryRecord {
                            user_id: user_id.to_string(),
                            items: self.cart.items().to_vec(),
                        });
                    }
                }
            }
        }
    }
}
