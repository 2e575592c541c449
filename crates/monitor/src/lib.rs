//! Background refresh of campaigns that are still in progress.

pub mod fetcher;
pub mod poller;

pub use fetcher::{CampaignFetcher, SnapshotFileFetcher};
pub use poller::{CampaignPoller, PollExit};
