use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use domain::{CartError, StockGateway};

#[derive(Deserialize)]
struct StockResponse {
    quantity: f64,
}

/// Live stock reads from the catalog collaborator, consumed by the
/// enhanced availability check.
pub struct CatalogStockGateway {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogStockGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CartError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl StockGateway for CatalogStockGateway {
    async fn current_stock(&self, item_id: &str) -> Result<f64, CartError> {
        let url = format!("{}/items/{}/stock", self.base_url, item_id);

        let payload: StockResponse = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?
            .error_for_status()
            .map_err(|e| CartError::NetworkError(e.to_string()))?
            .json()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        Ok(payload.quantity)
    }
}
