use std::sync::Arc;

use crate::entities::CartItem;
use crate::errors::CartError;
use crate::repositories::StockGateway;

/// Read-only stock validation. Never mutates the cart; callers decide
/// whether to reject, clamp, or prompt.
pub struct InventoryService {
    stock_gateway: Arc<dyn StockGateway>,
}

impl InventoryService {
    pub fn new(stock_gateway: Arc<dyn StockGateway>) -> Self {
        Self { stock_gateway }
    }

    /// Cheap check against the stock snapshot cached on the item. No I/O.
    pub fn check_simple(&self, item: &CartItem, requested: f64) -> bool {
        requested <= item.stock
    }

    /// Re-fetches live stock from the catalog and re-validates. Used at
    /// commit boundaries where a stale snapshot is unacceptable.
    pub async fn check_enhanced(&self, item: &CartItem, requested: f64) -> Result<bool, CartError> {
        let live = self.stock_gateway.current_stock(&item.id).await?;
        Ok(requested <= live)
    }

    /// Live stock value, for clamping decisions at commit boundaries.
    pub async fn live_stock(&self, item_id: &str) -> Result<f64, CartError> {
        self.stock_gateway.current_stock(item_id).await
    }
}
