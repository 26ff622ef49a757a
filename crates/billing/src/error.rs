//! Billing error types

use thiserror::Error;

/// Billing-specific errors
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Unauthorized: session is no longer valid")]
    Unauthorized,

    #[error("Tier reservation limit exceeded: {0}")]
    TierReservationConflict(String),

    #[error("Billing API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Tier catalog not loaded")]
    NotReady,
}

/// How a failed submit must be handled by the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    /// Session is dead: reset it and send the user to login
    Unauthorized,
    /// Target tier cannot hold the account's existing reservations
    TierReservationConflict,
    /// Network or server failure
    Other,
}

impl BillingError {
    pub fn kind(&self) -> SubmitErrorKind {
        match self {
            BillingError::Unauthorized => SubmitErrorKind::Unauthorized,
            BillingError::TierReservationConflict(_) => SubmitErrorKind::TierReservationConflict,
            _ => SubmitErrorKind::Other,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == SubmitErrorKind::Unauthorized
    }

    /// Text shown in the dialog's status area
    pub fn user_message(&self) -> String {
        match self.kind() {
            SubmitErrorKind::TierReservationConflict => {
                "Cannot change tier: the selected tier does not allow as many reserved topics as you currently have.".to_string()
            }
            SubmitErrorKind::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            SubmitErrorKind::Other => format!("Changing your subscription failed: {}", self),
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
