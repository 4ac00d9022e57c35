pub mod durable_store;
pub mod guest_store;
pub mod notifier;
pub mod stock_gateway;

pub use durable_store::DurableCartStore;
pub use guest_store::GuestCartStore;
pub use notifier::{Notice, Notifier};
pub use stock_gateway::StockGateway;
