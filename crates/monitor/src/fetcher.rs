//! Sources the poller can refresh a campaign from.

use hudey_core::error::{HudeyError, HudeyResult};
use hudey_core::types::{AnalyticsSnapshot, CampaignMetrics};
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;

/// Fetches the current state of one campaign.
pub trait CampaignFetcher: Send + Sync + 'static {
    fn fetch_campaign(
        &self,
        campaign_id: &str,
    ) -> impl Future<Output = HudeyResult<CampaignMetrics>> + Send;
}

/// Re-reads a dashboard snapshot file on every fetch and looks the
/// campaign up in its per-campaign list.
pub struct SnapshotFileFetcher {
    path: PathBuf,
}

impl SnapshotFileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CampaignFetcher for SnapshotFileFetcher {
    async fn fetch_campaign(&self, campaign_id: &str) -> HudeyResult<CampaignMetrics> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let snapshot = AnalyticsSnapshot::from_json(&json)?;
        debug!(path = %self.path.display(), campaign_id, "Snapshot file read");
        snapshot
            .campaign(campaign_id)
            .cloned()
            .ok_or_else(|| HudeyError::CampaignNotFound(campaign_id.to_string()))
    }
}
