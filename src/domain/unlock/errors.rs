//! Unlock-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | Authentication | 400 |
//! | Upstream | 500 |
//! | Infrastructure | 500 |
//!
//! Unknown users are not an error: status lookups report them as locked.

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors raised while creating a checkout or applying a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockError {
    /// Caller input was missing or malformed.
    ValidationFailed { field: String, message: String },

    /// Webhook could not be authenticated as coming from the provider.
    Authentication(String),

    /// The payment provider call failed.
    Upstream(String),

    /// The unlock ledger backend failed.
    Infrastructure(String),
}

impl UnlockError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        UnlockError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn authentication(reason: impl Into<String>) -> Self {
        UnlockError::Authentication(reason.into())
    }

    pub fn upstream(reason: impl Into<String>) -> Self {
        UnlockError::Upstream(reason.into())
    }

    pub fn infrastructure(reason: impl Into<String>) -> Self {
        UnlockError::Infrastructure(reason.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            UnlockError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            UnlockError::Authentication(_) => ErrorCode::InvalidWebhookSignature,
            UnlockError::Upstream(_) => ErrorCode::UpstreamError,
            UnlockError::Infrastructure(_) => ErrorCode::LedgerError,
        }
    }

    /// Returns the client-facing message.
    ///
    /// Upstream and infrastructure failures are opaque; their detail only
    /// goes to the logs.
    pub fn message(&self) -> String {
        match self {
            UnlockError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            UnlockError::Authentication(_) => "Webhook signature verification failed".to_string(),
            UnlockError::Upstream(_) => "Payment provider request failed".to_string(),
            UnlockError::Infrastructure(_) => "Internal server error".to_string(),
        }
    }

    /// Internal detail, suitable for logs only.
    pub fn detail(&self) -> &str {
        match self {
            UnlockError::ValidationFailed { message, .. } => message,
            UnlockError::Authentication(reason)
            | UnlockError::Upstream(reason)
            | UnlockError::Infrastructure(reason) => reason,
        }
    }
}

impl std::fmt::Display for UnlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.detail())
    }
}

impl std::error::Error for UnlockError {}

impl From<ValidationError> for UnlockError {
    fn from(err: ValidationError) -> Self {
        UnlockError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // Code mapping
    // ============================================================

    #[test]
    fn validation_maps_to_validation_failed() {
        let err = UnlockError::validation("userID", "required");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(err.message().contains("userID"));
    }

    #[test]
    fn authentication_maps_to_invalid_signature() {
        let err = UnlockError::authentication("timestamp too old");
        assert_eq!(err.code(), ErrorCode::InvalidWebhookSignature);
    }

    #[test]
    fn upstream_maps_to_upstream_error() {
        assert_eq!(UnlockError::upstream("boom").code(), ErrorCode::UpstreamError);
    }

    #[test]
    fn infrastructure_maps_to_ledger_error() {
        assert_eq!(UnlockError::infrastructure("down").code(), ErrorCode::LedgerError);
    }

    // ============================================================
    // Message opacity
    // ============================================================

    #[test]
    fn upstream_message_hides_provider_detail() {
        let err = UnlockError::upstream("No such price: 'price_123'; sk_test_secret");
        assert!(!err.message().contains("price_123"));
        assert!(!err.message().contains("sk_test"));
        assert!(err.to_string().contains("price_123"));
    }

    #[test]
    fn infrastructure_message_hides_backend_detail() {
        let err = UnlockError::infrastructure("redis://10.0.0.1 refused");
        assert!(!err.message().contains("redis"));
    }

    #[test]
    fn authentication_message_hides_reason() {
        let err = UnlockError::authentication("no v1 signature matched");
        assert_eq!(err.message(), "Webhook signature verification failed");
    }

    #[test]
    fn converts_from_validation_error() {
        let err: UnlockError = ValidationError::empty_field("userID").into();
        match err {
            UnlockError::ValidationFailed { field, message } => {
                assert_eq!(field, "userID");
                assert!(message.contains("cannot be empty"));
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }
}
