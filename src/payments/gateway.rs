//! External payment gateway client.
//!
//! The gateway is a partner boundary: we open orders on it and receive
//! signed callbacks from it. Only the order/verify contract matters here;
//! its checkout UI never touches this core.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use ulid::Ulid;

use super::error::PaymentError;

/// Order opened on the external gateway.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub gateway_order_id: String,
}

/// Client for the external payment service provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open an order for the given amount. The buyer completes checkout
    /// against this order id; the result arrives as a signed callback.
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError>;
}

/// In-process gateway for tests and simulation mode.
///
/// Generates deterministic-looking order ids without any network round trip.
pub struct MockGateway {
    fail: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// A gateway that rejects every order, for failure-path tests.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        if self.fail {
            return Err(PaymentError::GatewayUnavailable(
                "mock gateway set to fail".to_string(),
            ));
        }
        let gateway_order_id = format!("order_{}", Ulid::new());
        debug!(
            gateway_order_id = %gateway_order_id,
            amount_paise = amount_paise,
            currency = currency,
            receipt = receipt,
            "Mock gateway order opened"
        );
        Ok(GatewayOrder { gateway_order_id })
    }
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
}

/// HTTP client for the real gateway's orders API.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl HttpGateway {
    pub fn new(base_url: String, key_id: String, key_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            key_id,
            key_secret,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, PaymentError> {
        let body = serde_json::json!({
            "amount": amount_paise,
            "currency": currency,
            "receipt": receipt,
        });

        let resp = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PaymentError::GatewayUnavailable(format!(
                "gateway returned {}",
                resp.status()
            )));
        }

        let order: CreateOrderResponse = resp
            .json()
            .await
            .map_err(|e| PaymentError::GatewayUnavailable(e.to_string()))?;

        Ok(GatewayOrder {
            gateway_order_id: order.id,
        })
    }
}
