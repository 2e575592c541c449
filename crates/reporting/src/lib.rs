//! Campaign analytics and reporting: dashboard assembly, email delivery
//! summaries, scope-filtered rollups, funnels, budget and content
//! tracking, and tabular export.

pub mod assemble;
pub mod budget;
pub mod content;
pub mod dashboard;
pub mod delivery;
pub mod export;
pub mod funnel;
pub mod scope;

pub use assemble::{assemble_dashboard, CampaignSource};
pub use dashboard::ScopedDashboard;
pub use delivery::{delivery_summary, EmailEventRow};
pub use export::{ExportFormat, ExportTab, ExportTable};
pub use scope::derive;
