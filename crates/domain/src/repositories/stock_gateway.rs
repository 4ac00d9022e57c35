use async_trait::async_trait;

use crate::errors::CartError;

/// Read-only access to live catalog stock, used by the enhanced
/// availability check at commit boundaries.
#[async_trait]
pub trait StockGateway: Send + Sync {
    async fn current_stock(&self, item_id: &str) -> Result<f64, CartError>;
}
