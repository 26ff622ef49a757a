//! Upgrade dialog controller
//!
//! Owns the per-dialog state (catalog, selection, pending submit, status
//! text) and drives the billing call for the resolved transition. The handle
//! is cheap to clone so the host can dismiss the dialog while a request is in
//! flight; a response that arrives after dismissal leaves dialog state and the
//! browser alone, but an unauthorized one still resets the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use planshift_shared::Account;

use crate::api::BillingApi;
use crate::cards::{banner_text, build_cards, TierCard, DIALOG_TITLE};
use crate::catalog::{CatalogState, TierCatalog};
use crate::error::{BillingError, BillingResult, SubmitErrorKind};
use crate::session::{Navigator, SessionManager, LOGIN_ROUTE};
use crate::transition::{resolve, Resolution, TransitionAction};

/// Invoked on dismissal and after a successful update or cancel
pub type CloseCallback = Box<dyn Fn() + Send + Sync>;

/// Result of a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to do: not ready, closed, no-op selection, or already submitting
    Ignored,
    /// Subscription created; the user was sent to `url`
    Redirected { url: String },
    /// Subscription updated or cancelled; dialog closed
    Closed,
    /// Session was invalid; user sent to login
    SessionExpired,
    /// Recoverable failure; dialog stays open with `message` in the status area
    Failed {
        kind: SubmitErrorKind,
        message: String,
    },
    /// Dialog was dismissed before the response arrived
    Dismissed,
}

/// Snapshot of everything the dialog displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub title: &'static str,
    pub cards: Vec<TierCard>,
    pub resolution: Resolution,
    pub banner: Option<String>,
    pub status: Option<String>,
    pub submitting: bool,
}

/// Backend call for a resolved action
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmitRequest {
    Create(String),
    Update(String),
    Cancel,
}

impl SubmitRequest {
    fn for_action(action: TransitionAction, selected: Option<&str>) -> Option<Self> {
        match (action, selected) {
            (TransitionAction::Create, Some(tier)) => Some(Self::Create(tier.to_string())),
            (TransitionAction::Update, Some(tier)) => Some(Self::Update(tier.to_string())),
            (TransitionAction::Cancel, _) => Some(Self::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct DialogState {
    open: bool,
    catalog: CatalogState,
    selected: Option<String>,
    submitting: bool,
    status: Option<String>,
}

/// Clears the pending-submit flag when the submit finishes or its future is
/// dropped.
struct SubmitGuard<'a> {
    state: &'a Mutex<DialogState>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submitting = false;
    }
}

struct Inner<A, S, N> {
    api: A,
    session: S,
    navigator: N,
    account: Account,
    on_close: CloseCallback,
    state: Mutex<DialogState>,
}

/// Handle to one open upgrade dialog
pub struct UpgradeDialog<A, S, N> {
    inner: Arc<Inner<A, S, N>>,
}

impl<A, S, N> Clone for UpgradeDialog<A, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S, N> UpgradeDialog<A, S, N>
where
    A: BillingApi,
    S: SessionManager,
    N: Navigator,
{
    /// Open a dialog for `account`. The selection starts at the current tier.
    pub fn new(api: A, session: S, navigator: N, account: Account, on_close: CloseCallback) -> Self {
        let state = DialogState {
            open: true,
            selected: account.current_tier_code().map(str::to_string),
            ..Default::default()
        };
        Self {
            inner: Arc::new(Inner {
                api,
                session,
                navigator,
                account,
                on_close,
                state: Mutex::new(state),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DialogState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn account(&self) -> &Account {
        &self.inner.account
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn is_ready(&self) -> bool {
        let state = self.state();
        state.open && state.catalog.ready().is_some()
    }

    pub fn selected_tier_code(&self) -> Option<String> {
        self.state().selected.clone()
    }

    pub fn status(&self) -> Option<String> {
        self.state().status.clone()
    }

    /// Fetch the tier catalog. Only the first call hits the server; the
    /// dialog stays unready if that fetch fails. Returns `NotReady` while
    /// another fetch is pending, after a failed fetch, or once closed.
    pub async fn load_catalog(&self) -> BillingResult<()> {
        {
            let mut state = self.state();
            if !state.open {
                return Err(BillingError::NotReady);
            }
            match state.catalog {
                CatalogState::Ready(_) => return Ok(()),
                CatalogState::Loading | CatalogState::Failed => {
                    return Err(BillingError::NotReady)
                }
                CatalogState::Unloaded => state.catalog = CatalogState::Loading,
            }
        }

        let result = TierCatalog::fetch(&self.inner.api).await;

        let mut state = self.state();
        if !state.open {
            tracing::debug!("Dialog closed before tier catalog arrived, discarding");
            return Err(BillingError::NotReady);
        }
        match result {
            Ok(catalog) => {
                if !catalog.contains(state.selected.as_deref()) {
                    tracing::warn!(
                        tier = ?state.selected,
                        "Current tier is not offered in the catalog"
                    );
                }
                state.catalog = CatalogState::Ready(catalog);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load tier catalog");
                state.catalog = CatalogState::Failed;
                Err(e)
            }
        }
    }

    /// Select a tier by code (`None` = free). The code must exist in the
    /// loaded catalog.
    pub fn select(&self, code: Option<&str>) -> BillingResult<()> {
        let mut state = self.state();
        if !state.open {
            return Err(BillingError::NotReady);
        }
        let catalog = state.catalog.ready().ok_or(BillingError::NotReady)?;
        if !catalog.contains(code) {
            return Err(BillingError::UnknownTier(
                code.unwrap_or("free").to_string(),
            ));
        }
        state.selected = code.map(str::to_string);
        state.status = None;
        Ok(())
    }

    /// Current display state, `None` while loading or once closed
    pub fn view(&self) -> Option<DialogView> {
        let state = self.state();
        if !state.open {
            return None;
        }
        let catalog = state.catalog.ready()?;
        let account = &self.inner.account;

        let mut resolution = resolve(
            account.current_tier_code(),
            state.selected.as_deref(),
            account.paid_until(),
        );
        if state.submitting {
            resolution.submit_enabled = false;
        }

        Some(DialogView {
            title: DIALOG_TITLE,
            cards: build_cards(catalog.tiers(), state.selected.as_deref()),
            banner: resolution.banner.as_ref().map(banner_text),
            resolution,
            status: state.status.clone(),
            submitting: state.submitting,
        })
    }

    /// Apply the resolved transition. At most one submit runs at a time.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut state = self.state();
            if !state.open || state.submitting || state.catalog.ready().is_none() {
                return SubmitOutcome::Ignored;
            }
            let action = TransitionAction::resolve(
                self.inner.account.current_tier_code(),
                state.selected.as_deref(),
            );
            let Some(request) = SubmitRequest::for_action(action, state.selected.as_deref())
            else {
                return SubmitOutcome::Ignored;
            };
            state.submitting = true;
            state.status = None;
            request
        };
        let guard = SubmitGuard {
            state: &self.inner.state,
        };

        tracing::debug!(request = ?request, "Submitting subscription change");
        let api = &self.inner.api;
        let result = match &request {
            SubmitRequest::Create(tier) => api
                .create_subscription(tier)
                .await
                .map(|redirect| Some(redirect.redirect_url)),
            SubmitRequest::Update(tier) => api.update_subscription(tier).await.map(|_| None),
            SubmitRequest::Cancel => api.delete_subscription().await.map(|_| None),
        };

        drop(guard);

        // A dead session is reset even if the dialog is already gone
        if let Err(e) = &result {
            if e.is_unauthorized() {
                tracing::warn!(request = ?request, "Session expired while changing subscription");
                self.inner.session.reset_and_redirect(LOGIN_ROUTE);
                return SubmitOutcome::SessionExpired;
            }
        }

        let mut state = self.state();
        if !state.open {
            tracing::debug!(request = ?request, "Dialog dismissed before billing response, ignoring");
            return SubmitOutcome::Dismissed;
        }

        match result {
            Ok(Some(url)) => {
                drop(state);
                tracing::info!(request = ?request, "Redirecting to checkout");
                self.inner.navigator.navigate(&url);
                SubmitOutcome::Redirected { url }
            }
            Ok(None) => {
                state.open = false;
                drop(state);
                tracing::info!(request = ?request, "Subscription changed");
                (self.inner.on_close)();
                SubmitOutcome::Closed
            }
            Err(e) => {
                let message = e.user_message();
                tracing::warn!(request = ?request, error = %e, "Error changing billing subscription");
                state.status = Some(message.clone());
                SubmitOutcome::Failed {
                    kind: e.kind(),
                    message,
                }
            }
        }
    }

    /// Dismiss the dialog. The close callback fires once.
    pub fn close(&self) {
        {
            let mut state = self.state();
            if !state.open {
                return;
            }
            state.open = false;
        }
        (self.inner.on_close)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_for_action() {
        assert_eq!(
            SubmitRequest::for_action(TransitionAction::Create, Some("pro")),
            Some(SubmitRequest::Create("pro".to_string()))
        );
        assert_eq!(
            SubmitRequest::for_action(TransitionAction::Update, Some("business")),
            Some(SubmitRequest::Update("business".to_string()))
        );
        assert_eq!(
            SubmitRequest::for_action(TransitionAction::Cancel, None),
            Some(SubmitRequest::Cancel)
        );
        assert_eq!(SubmitRequest::for_action(TransitionAction::None, Some("pro")), None);
    }
}
