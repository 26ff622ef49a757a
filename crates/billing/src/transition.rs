//! Plan transition resolution
//!
//! Maps the account's current tier and the user's selected tier onto exactly
//! one [`TransitionAction`], and derives the submit control and banner the
//! dialog shows for it. Everything here is a pure function of its inputs.

use std::fmt;

use time::OffsetDateTime;

pub const LABEL_PAY_NOW: &str = "Pay now";
pub const LABEL_UPDATE_SUBSCRIPTION: &str = "Update subscription";
pub const LABEL_CANCEL_SUBSCRIPTION: &str = "Cancel subscription";

/// What submitting the current selection would do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionAction {
    /// Selection equals the current tier
    None,
    /// Free account picks a paid tier
    Create,
    /// Paid account picks a different paid tier
    Update,
    /// Paid account picks the free tier
    Cancel,
}

impl TransitionAction {
    /// Resolve the action for a (current, selected) pair.
    ///
    /// Precedence is significant: equal codes always win, so two absent
    /// codes are a no-op rather than anything else.
    pub fn resolve(current: Option<&str>, selected: Option<&str>) -> Self {
        if current == selected {
            Self::None
        } else if current.is_none() {
            Self::Create
        } else if selected.is_none() {
            Self::Cancel
        } else {
            Self::Update
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            Self::Create => LABEL_PAY_NOW,
            Self::Cancel => LABEL_CANCEL_SUBSCRIPTION,
            Self::None | Self::Update => LABEL_UPDATE_SUBSCRIPTION,
        }
    }

    pub fn submit_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Notice shown under the tier cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    /// Subscription ends at the close of the paid period
    CancelWarning { paid_until: Option<OffsetDateTime> },
    /// Switching between paid tiers is prorated
    ProrationInfo,
}

impl Banner {
    /// Select the banner for a resolved action, if any
    pub fn for_action(
        current: Option<&str>,
        action: TransitionAction,
        paid_until: Option<OffsetDateTime>,
    ) -> Option<Self> {
        match action {
            TransitionAction::Cancel => Some(Self::CancelWarning { paid_until }),
            TransitionAction::None | TransitionAction::Update if current.is_some() => {
                Some(Self::ProrationInfo)
            }
            _ => None,
        }
    }
}

/// Full resolver output for one (current, selected) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: TransitionAction,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub banner: Option<Banner>,
}

/// Resolve action, submit control and banner.
///
/// Account context is passed in explicitly so the result depends on nothing
/// but the arguments.
pub fn resolve(
    current: Option<&str>,
    selected: Option<&str>,
    paid_until: Option<OffsetDateTime>,
) -> Resolution {
    let action = TransitionAction::resolve(current, selected);
    Resolution {
        action,
        submit_label: action.submit_label(),
        submit_enabled: action.submit_enabled(),
        banner: Banner::for_action(current, action, paid_until),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODES: [Option<&str>; 4] = [None, Some("starter"), Some("pro"), Some("business")];

    fn paid_until() -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(1_741_046_400).ok()
    }

    #[test]
    fn test_action_table() {
        assert_eq!(TransitionAction::resolve(None, None), TransitionAction::None);
        assert_eq!(TransitionAction::resolve(Some("pro"), Some("pro")), TransitionAction::None);
        assert_eq!(TransitionAction::resolve(None, Some("pro")), TransitionAction::Create);
        assert_eq!(TransitionAction::resolve(Some("pro"), None), TransitionAction::Cancel);
        assert_eq!(
            TransitionAction::resolve(Some("pro"), Some("business")),
            TransitionAction::Update
        );
    }

    #[test]
    fn test_every_pair_resolves_per_precedence() {
        for current in CODES {
            for selected in CODES {
                let action = TransitionAction::resolve(current, selected);
                let expected = if current == selected {
                    TransitionAction::None
                } else {
                    match (current, selected) {
                        (None, Some(_)) => TransitionAction::Create,
                        (Some(_), None) => TransitionAction::Cancel,
                        _ => TransitionAction::Update,
                    }
                };
                assert_eq!(action, expected, "current={:?} selected={:?}", current, selected);
                assert_eq!(action.submit_enabled(), action != TransitionAction::None);
            }
        }
    }

    #[test]
    fn test_submit_labels() {
        assert_eq!(TransitionAction::None.submit_label(), "Update subscription");
        assert_eq!(TransitionAction::Create.submit_label(), "Pay now");
        assert_eq!(TransitionAction::Update.submit_label(), "Update subscription");
        assert_eq!(TransitionAction::Cancel.submit_label(), "Cancel subscription");
    }

    #[test]
    fn test_banner_properties_hold_for_every_pair() {
        for current in CODES {
            for selected in CODES {
                let resolution = resolve(current, selected, paid_until());
                let warning = matches!(resolution.banner, Some(Banner::CancelWarning { .. }));
                let proration = resolution.banner == Some(Banner::ProrationInfo);

                assert_eq!(warning, resolution.action == TransitionAction::Cancel);
                assert_eq!(
                    proration,
                    current.is_some()
                        && matches!(
                            resolution.action,
                            TransitionAction::None | TransitionAction::Update
                        )
                );
            }
        }
    }

    #[test]
    fn test_same_paid_tier_is_noop_with_proration_notice() {
        let resolution = resolve(Some("pro"), Some("pro"), paid_until());
        assert_eq!(resolution.action, TransitionAction::None);
        assert!(!resolution.submit_enabled);
        assert_eq!(resolution.banner, Some(Banner::ProrationInfo));
    }

    #[test]
    fn test_free_to_paid_is_create_without_banner() {
        let resolution = resolve(None, Some("pro"), None);
        assert_eq!(resolution.action, TransitionAction::Create);
        assert_eq!(resolution.submit_label, "Pay now");
        assert!(resolution.submit_enabled);
        assert_eq!(resolution.banner, None);
    }

    #[test]
    fn test_free_to_free_is_noop_without_banner() {
        let resolution = resolve(None, None, None);
        assert_eq!(resolution.action, TransitionAction::None);
        assert!(!resolution.submit_enabled);
        assert_eq!(resolution.banner, None);
    }

    #[test]
    fn test_paid_to_free_warns_with_paid_until() {
        let resolution = resolve(Some("pro"), None, paid_until());
        assert_eq!(resolution.action, TransitionAction::Cancel);
        assert_eq!(
            resolution.banner,
            Some(Banner::CancelWarning { paid_until: paid_until() })
        );
    }

    #[test]
    fn test_paid_to_paid_is_update_with_proration_notice() {
        let resolution = resolve(Some("pro"), Some("business"), paid_until());
        assert_eq!(resolution.action, TransitionAction::Update);
        assert!(resolution.submit_enabled);
        assert_eq!(resolution.banner, Some(Banner::ProrationInfo));
    }
}
