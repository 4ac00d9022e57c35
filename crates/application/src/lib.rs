pub mod coordinator;

pub use coordinator::{CartCommand, CartCoordinator, CartHandle, CartSnapshot, CartState};

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use domain::{
    CartError, CartOperations, DurableCartStore, GuestCartStore, Identity, InventoryService,
    MergeService, Notifier, StockGateway,
};
use infrastructure::{CatalogStockGateway, FileGuestStore, HttpCartStore, TracingNotifier};

/// Knobs for [`CartApp::start`].
pub struct CartAppConfig {
    pub cart_api_url: String,
    pub catalog_api_url: String,
    pub guest_storage_dir: String,
    pub save_debounce: Duration,
    pub save_timeout: Duration,
}

/// Cart application - wires infrastructure into the domain services and
/// spawns the coordinator.
pub struct CartApp {
    pub handle: CartHandle,
    pub task: JoinHandle<()>,
}

impl CartApp {
    pub fn start(config: &CartAppConfig, initial_identity: Identity) -> Result<Self, CartError> {
        let guest_store: Arc<dyn GuestCartStore> =
            Arc::new(FileGuestStore::new(&config.guest_storage_dir));
        let durable_store: Arc<dyn DurableCartStore> =
            Arc::new(HttpCartStore::new(&config.cart_api_url, config.save_timeout)?);
        let stock_gateway: Arc<dyn StockGateway> = Arc::new(CatalogStockGateway::new(
            &config.catalog_api_url,
            config.save_timeout,
        )?);
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

        Self::start_with(
            guest_store,
            durable_store,
            stock_gateway,
            notifier,
            initial_identity,
            config.save_debounce,
        )
    }

    /// Wiring seam used by integration tests to substitute in-memory
    /// collaborators for the HTTP and file-backed ones.
    pub fn start_with(
        guest_store: Arc<dyn GuestCartStore>,
        durable_store: Arc<dyn DurableCartStore>,
        stock_gateway: Arc<dyn StockGateway>,
        notifier: Arc<dyn Notifier>,
        initial_identity: Identity,
        save_debounce: Duration,
    ) -> Result<Self, CartError> {
        let inventory = InventoryService::new(stock_gateway);
        let operations = CartOperations::new(inventory);
        let merge = MergeService::new(
            Arc::clone(&guest_store),
            Arc::clone(&durable_store),
            Arc::clone(&notifier),
        );

        let (handle, coordinator) = CartCoordinator::new(
            operations,
            merge,
            guest_store,
            durable_store,
            notifier,
            initial_identity,
            save_debounce,
        );

        let task = tokio::spawn(coordinator.run());

        Ok(Self { handle, task })
    }
}
