pub mod config;
pub mod error;
pub mod rates;
pub mod types;

pub use config::AppConfig;
pub use error::{HudeyError, HudeyResult};
pub use types::{AnalyticsSnapshot, CampaignStatus, EngagementStatus, Scope};
