//! Tier cards and banner text for the upgrade dialog

use planshift_shared::{format_bytes, format_number, format_short_date, Tier};

use crate::transition::Banner;

pub const DIALOG_TITLE: &str = "Change account tier";
pub const FREE_TIER_LABEL: &str = "Free";
pub const SELECTED_BADGE: &str = "Selected";

const PRORATION_INFO: &str = "When switching between paid plans, the price difference will be prorated and charged or refunded in the next invoice.";

/// One selectable tier, ready to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCard {
    /// Code the card selects when clicked (`None` = free tier)
    pub code: Option<String>,
    pub title: String,
    pub features: Vec<String>,
    pub price: Option<String>,
    pub selected: bool,
}

impl TierCard {
    pub fn build(tier: &Tier, selected: bool) -> Self {
        let limits = &tier.limits;
        let mut features = Vec::with_capacity(5);
        if limits.reservations > 0 {
            features.push(format!("{} reserved topics", limits.reservations));
        }
        features.push(format!("{} daily messages", format_number(limits.messages)));
        features.push(format!("{} daily emails", format_number(limits.emails)));
        features.push(format!(
            "{} per file",
            format_bytes(limits.attachment_file_size, 0)
        ));
        features.push(format!(
            "{} total storage",
            format_bytes(limits.attachment_total_size, 0)
        ));

        Self {
            code: tier.code.clone(),
            title: tier
                .name
                .clone()
                .unwrap_or_else(|| FREE_TIER_LABEL.to_string()),
            features,
            price: tier.price.as_ref().map(|p| format!("{} / month", p)),
            selected,
        }
    }

    /// Plain-text rendering for terminals
    pub fn render_text(&self) -> String {
        let mut out = self.title.clone();
        if self.selected {
            out.push_str(&format!(" [{}]", SELECTED_BADGE.to_lowercase()));
        }
        out.push('\n');
        for feature in &self.features {
            out.push_str(&format!("  ✓ {}\n", feature));
        }
        if let Some(price) = &self.price {
            out.push_str(&format!("  {}\n", price));
        }
        out
    }
}

/// Build cards for a catalog, marking the one matching `selected`
pub fn build_cards(tiers: &[Tier], selected: Option<&str>) -> Vec<TierCard> {
    tiers
        .iter()
        .map(|tier| TierCard::build(tier, tier.has_code(selected)))
        .collect()
}

/// Banner text. Falls back to a generic phrase when the paid-until date is
/// unknown or cannot be formatted.
pub fn banner_text(banner: &Banner) -> String {
    match banner {
        Banner::CancelWarning { paid_until } => {
            let date = paid_until
                .and_then(|t| format_short_date(t).ok())
                .unwrap_or_else(|| "the end of the billing period".to_string());
            format!(
                "Your subscription will be cancelled on {}. You will not be charged again.",
                date
            )
        }
        Banner::ProrationInfo => PRORATION_INFO.to_string(),
    }
}
