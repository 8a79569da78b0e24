//! Payment processor bridge.
//!
//! Two halves:
//!
//! - [`PaymentClient`] creates payment intents over the processor's HTTP
//!   API. Amounts are converted to minor units (cents) at this boundary;
//!   everywhere else money is decimal.
//! - [`verify_signature`] checks the `Payment-Signature` header on webhook
//!   deliveries before the payload is trusted: `t=<unix>,v1=<hex>` where
//!   the hex value is HMAC-SHA256 over `"{t}.{raw body}"`. Comparison is
//!   constant-time and stale timestamps are rejected.

use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use sundry_core::{Money, OrderId};

use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Accepted clock skew between the processor's timestamp and ours.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Errors from the payment processor client.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport-level failure talking to the processor.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor rejected the request.
    #[error("processor returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Webhook signature verification failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Header missing or not in `t=...,v1=...` form.
    #[error("malformed signature header")]
    Malformed,

    /// Timestamp outside the accepted tolerance.
    #[error("signature timestamp outside tolerance")]
    StaleTimestamp,

    /// HMAC did not match.
    #[error("signature mismatch")]
    Mismatch,
}

/// A created payment intent, as returned to the storefront client.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PaymentIntent {
    /// Processor-side intent id.
    pub id: String,
    /// Client-side secret the frontend hands to the processor's JS SDK.
    pub client_secret: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}

/// HTTP client for the payment processor.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
    currency: String,
}

impl PaymentClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Create a payment intent for an order.
    ///
    /// The order id rides along in transaction metadata; the webhook uses
    /// it to find the order again.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` on transport failure and
    /// `PaymentError::Api` when the processor rejects the request.
    pub async fn create_intent(
        &self,
        order_id: OrderId,
        order_number: &str,
        total: Money,
    ) -> Result<PaymentIntent, PaymentError> {
        let amount = total.to_minor_units();

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&[
                ("amount", amount.to_string()),
                ("currency", self.currency.clone()),
                ("metadata[order_id]", order_id.to_string()),
                ("metadata[order_number]", order_number.to_owned()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api { status, message });
        }

        let intent = response.json::<PaymentIntent>().await?;
        tracing::info!(order_id = %order_id, intent_id = %intent.id, "Payment intent created");
        Ok(intent)
    }
}

// =============================================================================
// Webhook signature verification
// =============================================================================

/// Verify a webhook signature header against the raw request body.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing why verification failed; the
/// payload must not be trusted in that case.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    webhook_secret: &str,
    now_unix: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut provided: Option<Vec<u8>> = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => provided = hex::decode(value).ok(),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    let provided = provided.ok_or(SignatureError::Malformed)?;

    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Mac::verify_slice is constant-time
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::Mismatch)
}

/// A webhook event envelope from the processor.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Unique event id, used for idempotency.
    pub id: String,
    /// Event type, e.g. `payment_intent.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookIntent,
}

/// The intent object inside a webhook event.
#[derive(Debug, Deserialize)]
pub struct WebhookIntent {
    pub id: String,
    #[serde(default)]
    pub metadata: WebhookMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookMetadata {
    /// The order id we stamped on the intent at creation time.
    pub order_id: Option<String>,
}

impl WebhookIntent {
    /// The order this intent belongs to, if the metadata survived.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        self.metadata
            .order_id
            .as_deref()
            .and_then(|raw| raw.parse::<i32>().ok())
            .map(OrderId::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_testsecret";

    fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign(payload, 1_700_000_000, SECRET);
        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_000_010),
            Ok(())
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign(payload, 1_700_000_000, "whsec_other");
        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_000_000),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = sign(br#"{"amount":100}"#, 1_700_000_000, SECRET);
        assert_eq!(
            verify_signature(br#"{"amount":999}"#, &header, SECRET, 1_700_000_000),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = b"{}";
        let header = sign(payload, 1_700_000_000, SECRET);
        assert_eq!(
            verify_signature(payload, &header, SECRET, 1_700_000_000 + 3600),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert_eq!(
            verify_signature(b"{}", "not-a-signature", SECRET, 0),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(b"{}", "t=abc,v1=zz", SECRET, 0),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_webhook_event_parsing() {
        let raw = r#"{
            "id": "evt_123",
            "type": "payment_intent.succeeded",
            "data": { "object": {
                "id": "pi_456",
                "metadata": { "order_id": "42", "order_number": "ORD-20250314-AB12C" }
            }}
        }"#;

        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.data.object.order_id(), Some(OrderId::new(42)));
    }

    #[test]
    fn test_webhook_event_missing_metadata() {
        let raw = r#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.data.object.order_id(), None);
    }
}
