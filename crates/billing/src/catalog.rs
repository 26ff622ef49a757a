//! Tier catalog, fetched once per dialog

use planshift_shared::Tier;

use crate::api::BillingApi;
use crate::error::BillingResult;

/// Ordered tiers as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    /// Fetch the catalog from the billing server
    pub async fn fetch<A: BillingApi>(api: &A) -> BillingResult<Self> {
        let tiers = api.list_tiers().await?;
        tracing::debug!(count = tiers.len(), "Loaded tier catalog");
        Ok(Self::new(tiers))
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Whether some tier carries `code` (`None` = the free tier)
    pub fn contains(&self, code: Option<&str>) -> bool {
        self.tiers.iter().any(|t| t.has_code(code))
    }
}

/// Load progress of the dialog's catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    #[default]
    Unloaded,
    Loading,
    Ready(TierCatalog),
    /// The single fetch failed; the dialog stays unready
    Failed,
}

impl CatalogState {
    pub fn ready(&self) -> Option<&TierCatalog> {
        match self {
            CatalogState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }
}
