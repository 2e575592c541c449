//! Fixed-interval refresh of a single campaign while it is running.
//!
//! Each tick fetches the campaign and replaces the published value. The
//! task stops on its own once the campaign leaves an active status, and is
//! cancelled when the owning [`CampaignPoller`] is cancelled or dropped.
//! A failed fetch is logged and the next tick tries again.

use hudey_core::error::{HudeyError, HudeyResult};
use hudey_core::types::{CampaignMetrics, CampaignStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::fetcher::CampaignFetcher;

/// Why a polling task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// The campaign reached a status that no longer changes on its own.
    Inactive(CampaignStatus),
    Cancelled,
}

/// Handle to a running polling task. Dropping it stops the task.
pub struct CampaignPoller {
    campaign_id: String,
    latest: watch::Receiver<Option<CampaignMetrics>>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<PollExit>>,
}

impl CampaignPoller {
    /// Start polling `campaign_id` every `period`, beginning immediately.
    pub fn spawn<F: CampaignFetcher>(
        fetcher: Arc<F>,
        campaign_id: impl Into<String>,
        period: Duration,
    ) -> HudeyResult<Self> {
        if period.is_zero() {
            return Err(HudeyError::Config("poll interval must be non-zero".into()));
        }

        let campaign_id = campaign_id.into();
        let (latest_tx, latest) = watch::channel(None);
        let (cancel, cancel_rx) = oneshot::channel();

        info!(campaign_id = %campaign_id, period_ms = period.as_millis() as u64, "Campaign polling started");

        let task = tokio::spawn(run(fetcher, campaign_id.clone(), period, latest_tx, cancel_rx));

        Ok(Self {
            campaign_id,
            latest,
            cancel: Some(cancel),
            task: Some(task),
        })
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    /// Most recently fetched campaign state, if any fetch has succeeded.
    pub fn latest(&self) -> Option<CampaignMetrics> {
        self.latest.borrow().clone()
    }

    /// Receiver that is notified on every successful fetch.
    pub fn subscribe(&self) -> watch::Receiver<Option<CampaignMetrics>> {
        self.latest.clone()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // the task may already have exited
            let _ = cancel.send(());
        }
    }

    /// Wait for the task to end without cancelling it.
    pub async fn join(mut self) -> HudeyResult<PollExit> {
        let _keep_alive = self.cancel.take();
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| HudeyError::Internal(anyhow_from_join(e))),
            None => Ok(PollExit::Cancelled),
        }
    }
}

impl Drop for CampaignPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn anyhow_from_join(err: tokio::task::JoinError) -> anyhow::Error {
    anyhow::Error::new(err).context("campaign polling task failed")
}

async fn run<F: CampaignFetcher>(
    fetcher: Arc<F>,
    campaign_id: String,
    period: Duration,
    latest: watch::Sender<Option<CampaignMetrics>>,
    mut cancel: oneshot::Receiver<()>,
) -> PollExit {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => break,
            _ = interval.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = &mut cancel => break,
            result = fetcher.fetch_campaign(&campaign_id) => result,
        };

        match fetched {
            Ok(campaign) => {
                let status = campaign.status;
                latest.send_replace(Some(campaign));
                metrics::counter!("monitor.poll.fetched").increment(1);
                debug!(campaign_id = %campaign_id, status = %status, "Campaign refreshed");

                if !status.is_active() {
                    info!(campaign_id = %campaign_id, status = %status, "Campaign no longer active, polling stopped");
                    return PollExit::Inactive(status);
                }
            }
            Err(e) => {
                metrics::counter!("monitor.poll.errors").increment(1);
                warn!(campaign_id = %campaign_id, error = %e, "Campaign refresh failed");
            }
        }
    }

    info!(campaign_id = %campaign_id, "Campaign polling cancelled");
    PollExit::Cancelled
}
