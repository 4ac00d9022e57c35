pub mod catalog;
pub mod notifier;
pub mod stores;

pub use catalog::CatalogStockGateway;
pub use notifier::TracingNotifier;
pub use stores::{FileGuestStore, HttpCartStore};
