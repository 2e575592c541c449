//! Campaign performance dashboard: holds the latest snapshot and serves
//! memoized scope-filtered views of it.

use hudey_core::types::{AnalyticsSnapshot, CampaignMetrics, Scope};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::debug;

use crate::scope::derive;

struct CachedView {
    source: Arc<AnalyticsSnapshot>,
    scope: Scope,
    view: Arc<AnalyticsSnapshot>,
}

/// Shared dashboard state.
///
/// [`ScopedDashboard::view`] hands out the same `Arc` for as long as the
/// snapshot and the requested scope stay the same, so consumers can use
/// pointer equality to skip re-rendering.
pub struct ScopedDashboard {
    snapshot: RwLock<Arc<AnalyticsSnapshot>>,
    cache: Mutex<Option<CachedView>>,
}

impl ScopedDashboard {
    pub fn new(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            cache: Mutex::new(None),
        }
    }

    /// Swap in a freshly fetched snapshot. Cached views are dropped.
    pub fn replace_snapshot(&self, snapshot: AnalyticsSnapshot) {
        *self.snapshot.write() = Arc::new(snapshot);
        *self.cache.lock() = None;
        metrics::counter!("reporting.snapshot.replaced").increment(1);
    }

    pub fn snapshot(&self) -> Arc<AnalyticsSnapshot> {
        self.snapshot.read().clone()
    }

    /// Metrics restricted to `scope`, recomputed only when the snapshot or
    /// scope changed since the previous call.
    pub fn view(&self, scope: &Scope) -> Arc<AnalyticsSnapshot> {
        let source = self.snapshot();
        let mut cache = self.cache.lock();

        if let Some(cached) = cache.as_ref() {
            if Arc::ptr_eq(&cached.source, &source) && cached.scope == *scope {
                metrics::counter!("reporting.scope.cache_hit").increment(1);
                return cached.view.clone();
            }
        }

        let view = Arc::new(derive(&source, scope));
        debug!(
            scope = %scope,
            campaigns = view.total_campaigns,
            creators = view.total_creators_contacted,
            "Recomputed scoped dashboard"
        );
        metrics::counter!("reporting.scope.recomputed").increment(1);

        *cache = Some(CachedView {
            source,
            scope: scope.clone(),
            view: view.clone(),
        });
        view
    }

    pub fn get_campaign_metrics(&self, campaign_id: &str) -> Option<CampaignMetrics> {
        self.snapshot.read().campaign(campaign_id).cloned()
    }

    pub fn list_campaign_metrics(&self) -> Vec<CampaignMetrics> {
        self.snapshot.read().per_campaign.clone()
    }
}

impl Default for ScopedDashboard {
    fn default() -> Self {
        Self::new(AnalyticsSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudey_core::types::CampaignStatus;

    fn snapshot_with(ids: &[&str]) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            per_campaign: ids
                .iter()
                .map(|id| CampaignMetrics {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    status: CampaignStatus::Running,
                    creators: 0,
                    responded: 0,
                    agreed: 0,
                    emails_sent: 0,
                    open_rate: 0,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_view_is_memoized() {
        let dashboard = ScopedDashboard::new(snapshot_with(&["cmp-1", "cmp-2"]));
        let scope = Scope::Campaign("cmp-1".into());

        let first = dashboard.view(&scope);
        let second = dashboard.view(&scope);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.total_campaigns, 1);
    }

    #[test]
    fn test_scope_change_recomputes() {
        let dashboard = ScopedDashboard::new(snapshot_with(&["cmp-1", "cmp-2"]));
        let narrow = dashboard.view(&Scope::Campaign("cmp-1".into()));
        let all = dashboard.view(&Scope::All);
        assert!(!Arc::ptr_eq(&narrow, &all));
        assert_eq!(all.total_campaigns, 2);
    }

    #[test]
    fn test_replace_snapshot_invalidates() {
        let dashboard = ScopedDashboard::new(snapshot_with(&["cmp-1"]));
        let before = dashboard.view(&Scope::All);

        dashboard.replace_snapshot(snapshot_with(&["cmp-1", "cmp-2", "cmp-3"]));
        let after = dashboard.view(&Scope::All);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.total_campaigns, 1);
        assert_eq!(after.total_campaigns, 3);
    }

    #[test]
    fn test_campaign_lookup() {
        let dashboard = ScopedDashboard::new(snapshot_with(&["cmp-1", "cmp-2"]));
        assert_eq!(dashboard.get_campaign_metrics("cmp-2").unwrap().name, "CMP-2");
        assert!(dashboard.get_campaign_metrics("cmp-3").is_none());
        assert_eq!(dashboard.list_campaign_metrics().len(), 2);
    }
}
