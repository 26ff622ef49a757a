//! planshift Billing
//!
//! Client-side subscription tier changes: the billing server client, the tier
//! catalog, the plan transition resolver and the upgrade dialog controller
//! that ties them together.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod cards;
pub mod catalog;
pub mod client;
pub mod dialog;
pub mod error;
pub mod session;
pub mod transition;

pub use api::{BillingApi, CheckoutRedirect};
pub use cards::{banner_text, build_cards, TierCard};
pub use catalog::{CatalogState, TierCatalog};
pub use client::{BillingClient, BillingConfig};
pub use dialog::{CloseCallback, DialogView, SubmitOutcome, UpgradeDialog};
pub use error::{BillingError, BillingResult, SubmitErrorKind};
pub use session::{Navigator, SessionManager, LOGIN_ROUTE};
pub use transition::{resolve, Banner, Resolution, TransitionAction};
