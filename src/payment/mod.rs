//! Payment confirmation signatures and the upstream gateway client.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with the account secret
//! using HMAC-SHA256 and hands the hex digest to the client; the client
//! returns all three values and they are checked here before anything is
//! trusted.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::aggregates::PaymentConfirmation;

pub mod gateway;

pub use gateway::{GatewayError, GatewayOrder, GatewayOrderRequest, PaymentGateway, RazorpayGateway};

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Missing required payment details")]
    MissingDetails,
    #[error("Transaction is not legit!")]
    Mismatch,
    #[error("invalid signing key: {0}")]
    Key(String),
}

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Hex HMAC-SHA256 of `"{order_id}|{payment_id}"`.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> Result<String, SignatureError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| SignatureError::Key(e.to_string()))?;
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks all three values are present, then compares the signature in constant time.
    pub fn verify(
        &self,
        order_id: Option<&str>,
        payment_id: Option<&str>,
        signature: Option<&str>,
    ) -> Result<(), SignatureError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }
        let (Some(order_id), Some(payment_id), Some(signature)) =
            (present(order_id), present(payment_id), present(signature))
        else {
            return Err(SignatureError::MissingDetails);
        };

        let expected = self.sign(order_id, payment_id)?;
        if !constant_time_compare(&expected, signature) {
            tracing::warn!(order_id, payment_id, "Payment signature mismatch");
            return Err(SignatureError::Mismatch);
        }
        tracing::debug!(order_id, "Payment signature verified");
        Ok(())
    }

    pub fn verify_confirmation(&self, confirmation: &PaymentConfirmation) -> Result<(), SignatureError> {
        self.verify(
            Some(&confirmation.gateway_order_id),
            Some(&confirmation.payment_id),
            Some(&confirmation.signature),
        )
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
