pub mod cart_operations;
pub mod inventory_service;
pub mod merge_service;
pub mod quantity;

pub use cart_operations::{CartOperations, MutationOutcome};
pub use inventory_service::InventoryService;
pub use merge_service::{merge_carts, MergeOutcome, MergeService, MergeState};
pub use quantity::{validate_quantity, QuantityCheck};
