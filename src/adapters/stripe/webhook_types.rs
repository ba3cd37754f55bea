//! Stripe-specific types for webhook handling and the Checkout API.
//!
//! These types represent Stripe API objects as they arrive in webhook payloads
//! and API responses. Only the fields the unlock flow reads are modeled; the
//! rest of each object is ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata key carrying the caller's user identifier on a checkout session.
pub const USER_ID_METADATA_KEY: &str = "userID";

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    /// Header is empty or missing.
    MissingHeader,
    /// A component was not of the form `key=value`.
    MalformedComponent,
    /// Missing timestamp component (t=...).
    MissingTimestamp,
    /// Missing v1 signature component.
    MissingV1Signature,
    /// Invalid timestamp format.
    InvalidTimestamp,
    /// Invalid signature format (not valid hex).
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing Stripe-Signature header"),
            Self::MalformedComponent => write!(f, "Malformed component in signature header"),
            Self::MissingTimestamp => write!(f, "Missing timestamp (t=) in signature"),
            Self::MissingV1Signature => write!(f, "Missing v1 signature in header"),
            Self::InvalidTimestamp => write!(f, "Invalid timestamp format"),
            Self::InvalidSignatureFormat => write!(f, "Invalid signature format (not valid hex)"),
        }
    }
}

impl std::error::Error for SignatureParseError {}

/// Parsed Stripe-Signature header components.
///
/// The header format is: `t=timestamp,v1=signature[,v1=signature...][,v0=legacy]`.
/// Stripe sends more than one `v1` entry while a signing secret is being
/// rolled, so every one of them is kept.
///
/// # Example
///
/// ```ignore
/// let header = "t=1704067200,v1=abc123def456...";
/// let parsed = SignatureHeader::parse(header)?;
/// assert_eq!(parsed.timestamp, 1704067200);
/// ```
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the delivery.
    pub timestamp: i64,

    /// v1 signatures (HMAC-SHA256, hex-decoded). Never empty.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse a Stripe-Signature header into components.
    ///
    /// Unknown schemes (including the legacy `v0`) are ignored.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureParseError::MalformedComponent)?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let bytes = hex::decode(value.trim())
                        .map_err(|_| SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(bytes);
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if timestamp <= 0 {
            return Err(SignatureParseError::InvalidTimestamp);
        }
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event as received from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    #[serde(default)]
    pub created: i64,

    /// Event payload containing the affected object.
    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,

    /// Stripe API version used for this event.
    pub api_version: Option<String>,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
///
/// Used both for the `data.object` of checkout events and for the response
/// of `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted checkout URL. Present on creation, null once the session completes.
    pub url: Option<String>,

    /// Session payment status (paid, unpaid, no_payment_required).
    pub payment_status: Option<String>,

    /// Session status (open, complete, expired).
    pub status: Option<String>,

    /// Reference supplied at creation time.
    pub client_reference_id: Option<String>,

    /// Custom metadata attached to the session.
    pub metadata: Option<HashMap<String, String>>,

    /// Payment mode (payment, setup, subscription).
    pub mode: Option<String>,
}

impl StripeCheckoutSession {
    /// User identifier echoed back by Stripe.
    ///
    /// Reads `metadata.userID` first and falls back to `client_reference_id`.
    /// Empty values count as absent.
    pub fn user_id(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(USER_ID_METADATA_KEY))
            .filter(|v| !v.is_empty())
            .or_else(|| self.client_reference_id.as_ref().filter(|v| !v.is_empty()))
            .cloned()
    }
}

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiErrorBody {
    pub error: StripeApiError,
}

/// Error details inside [`StripeApiErrorBody`].
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    /// Error category (api_error, card_error, invalid_request_error, ...).
    #[serde(rename = "type")]
    pub error_type: String,

    /// Short machine-readable code, e.g. `resource_missing`.
    pub code: Option<String>,

    /// Human-readable message.
    pub message: Option<String>,
}
