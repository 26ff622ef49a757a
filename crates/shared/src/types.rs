//! Common types used across planshift

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// Tiers
// =============================================================================

/// A billing plan offered by the server.
///
/// The free tier carries no code, name or price. Tiers are reference data:
/// they are fetched once per dialog and never mutated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display price, already formatted by the server (e.g. "$5")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default)]
    pub limits: TierLimits,
}

impl Tier {
    /// Whether this tier is the one identified by `code` (`None` = free)
    pub fn has_code(&self, code: Option<&str>) -> bool {
        self.code.as_deref() == code
    }
}

/// Quota fields attached to a tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierLimits {
    /// Max reserved topics (namespaces)
    pub reservations: i64,
    /// Max messages per day
    pub messages: i64,
    /// Seconds a message is kept
    pub messages_expiry_duration: i64,
    /// Max emails per day
    pub emails: i64,
    /// Max size of a single attachment, in bytes
    pub attachment_file_size: i64,
    /// Max total attachment storage, in bytes
    pub attachment_total_size: i64,
    /// Seconds an attachment is kept
    pub attachment_expiry_duration: i64,
    /// Max daily attachment bandwidth, in bytes
    pub attachment_bandwidth: i64,
}

// =============================================================================
// Account
// =============================================================================

/// The signed-in account as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<AccountTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<AccountBilling>,
}

impl Account {
    /// Code of the tier the account is subscribed to, `None` on the free tier
    pub fn current_tier_code(&self) -> Option<&str> {
        self.tier.as_ref().and_then(|t| t.code.as_deref())
    }

    /// End of the currently paid period, if any
    pub fn paid_until(&self) -> Option<OffsetDateTime> {
        self.billing.as_ref().and_then(|b| b.paid_until)
    }
}

/// Tier reference embedded in the account record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Billing state of the account. Timestamps are Unix seconds on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBilling {
    #[serde(default)]
    pub customer: bool,
    #[serde(default)]
    pub subscription: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub paid_until: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub cancel_at: Option<OffsetDateTime>,
}

// =============================================================================
// Tests
// =============================================================================
