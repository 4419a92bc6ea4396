//! Upstream payment gateway client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RazorpayConfig;

pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Order creation request; `amount` is in the currency's smallest unit.
#[derive(Clone, Debug, Serialize)]
pub struct GatewayOrderRequest {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

/// Order as returned by the gateway. Fields not modelled here pass through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    #[serde(flatten)]
    request: &'a GatewayOrderRequest,
    payment_capture: u8,
}

pub struct RazorpayGateway {
    client: Client,
    api_base: String,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayGateway {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[tracing::instrument(skip(self), fields(receipt = %request.receipt))]
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&CreateOrderBody { request, payment_capture: 1 })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status: status.as_u16(), body });
        }

        let order: GatewayOrder = response.json().await?;
        tracing::info!(gateway_order_id = %order.id, "Gateway order created");
        Ok(order)
    }
}
