//! Billing server operations consumed by the upgrade dialog

use std::future::Future;
use std::sync::Arc;

use planshift_shared::Tier;
use serde::{Deserialize, Serialize};

use crate::error::BillingResult;

/// Response to a subscription create: where to send the user to pay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub redirect_url: String,
}

/// Billing operations the dialog drives.
///
/// All subscription calls fail with `Unauthorized`, `TierReservationConflict`
/// or a generic error; see [`crate::error::SubmitErrorKind`].
pub trait BillingApi: Send + Sync {
    /// Ordered list of available tiers. Idempotent.
    fn list_tiers(&self) -> impl Future<Output = BillingResult<Vec<Tier>>> + Send;

    /// Start a paid subscription; the caller must follow the redirect
    fn create_subscription(
        &self,
        tier: &str,
    ) -> impl Future<Output = BillingResult<CheckoutRedirect>> + Send;

    /// Switch an existing subscription to another paid tier
    fn update_subscription(&self, tier: &str) -> impl Future<Output = BillingResult<()>> + Send;

    /// Cancel the subscription at the end of the paid period
    fn delete_subscription(&self) -> impl Future<Output = BillingResult<()>> + Send;
}

impl<T: BillingApi> BillingApi for Arc<T> {
    fn list_tiers(&self) -> impl Future<Output = BillingResult<Vec<Tier>>> + Send {
        (**self).list_tiers()
    }

    fn create_subscription(
        &self,
        tier: &str,
    ) -> impl Future<Output = BillingResult<CheckoutRedirect>> + Send {
        (**self).create_subscription(tier)
    }

    fn update_subscription(&self, tier: &str) -> impl Future<Output = BillingResult<()>> + Send {
        (**self).update_subscription(tier)
    }

    fn delete_subscription(&self) -> impl Future<Output = BillingResult<()>> + Send {
        (**self).delete_subscription()
    }
}
