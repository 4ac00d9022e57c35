use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use domain::{Cart, CartError, CartItem, CartOwner, DurableCartStore};

#[derive(Deserialize)]
struct CartResponse {
    items: Vec<CartItem>,
}

#[derive(Serialize)]
struct SaveRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    items: &'a [CartItem],
}

/// Durable cart tier over the backend HTTP API.
///
/// `GET {base}/cart` reads the current account's cart (identity travels
/// in the ambient request credentials). `POST {base}/cart/save` replaces
/// the entire remote item list. Acknowledged saves are bounded by the
/// configured timeout and never retried automatically.
pub struct HttpCartStore {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpCartStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CartError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    fn cart_url(&self) -> String {
        format!("{}/cart", self.base_url)
    }

    fn save_url(&self) -> String {
        format!("{}/cart/save", self.base_url)
    }

    fn classify(&self, error: reqwest::Error) -> CartError {
        if error.is_timeout() {
            return CartError::TimeoutError(self.timeout_secs);
        }
        match error.status() {
            Some(status) if status.is_client_error() => {
                CartError::ValidationError(format!("cart request rejected: HTTP {status}"))
            }
            Some(status) => CartError::ServerError(status.as_u16()),
            None => CartError::NetworkError(error.to_string()),
        }
    }
}

#[async_trait]
impl DurableCartStore for HttpCartStore {
    async fn load(&self, owner: &CartOwner) -> Result<Cart, CartError> {
        owner.user_id().ok_or(CartError::MissingUserId)?;

        let response = self
            .client
            .get(self.cart_url())
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()
            .map_err(|e| self.classify(e))?;

        let payload: CartResponse = response
            .json()
            .await
            .map_err(|e| CartError::NetworkError(e.to_string()))?;

        Ok(Cart::from_items(payload.items))
    }

    async fn save(&self, owner: &CartOwner, cart: &Cart) -> Result<(), CartError> {
        let user_id = owner.user_id().ok_or(CartError::MissingUserId)?;

        let body = SaveRequest {
            user_id,
            items: cart.items(),
        };

        self.client
            .post(self.save_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()
            .map_err(|e| self.classify(e))?;

        tracing::debug!(items = cart.len(), "durable cart save acknowledged");
        Ok(())
    }

    fn save_best_effort(&self, owner: &CartOwner, cart: &Cart) -> bool {
        let Some(user_id) = owner.user_id() else {
            return false;
        };

        // The beacon analog: the write rides on a spawned task that nobody
        // awaits. Without a runtime to carry it, dispatch is impossible and
        // the caller falls back to the recovery slot.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no runtime for best-effort save, falling back to recovery slot");
            return false;
        };

        let body = serde_json::json!({
            "userId": user_id,
            "items": cart.items(),
        });
        let client = self.client.clone();
        let url = self.save_url();

        handle.spawn(async move {
            match client.post(url).json(&body).send().await {
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "best-effort cart flush sent")
                }
                Err(error) => tracing::debug!(%error, "best-effort cart flush failed"),
            }
        });

        true
    }
}
