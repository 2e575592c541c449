//! Dashboard data model. Mirrors the camelCase JSON returned by the
//! analytics dashboard endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::HudeyError;

/// Lifecycle state of a campaign, owned by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Running,
    AwaitingApproval,
    Completed,
    Failed,
}

impl CampaignStatus {
    /// Whether the campaign detail view should keep polling.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Running => "running",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outreach progress of one creator within one campaign. Variant order is
/// funnel order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    #[default]
    Contacted,
    Responded,
    Negotiating,
    Agreed,
    Declined,
}

impl EngagementStatus {
    pub const FUNNEL: [EngagementStatus; 5] = [
        Self::Contacted,
        Self::Responded,
        Self::Negotiating,
        Self::Agreed,
        Self::Declined,
    ];

    /// Any status past `contacted` counts as a response, declines included.
    pub fn has_responded(self) -> bool {
        self != Self::Contacted
    }

    pub fn is_agreed(self) -> bool {
        self == Self::Agreed
    }

    pub fn is_declined(self) -> bool {
        self == Self::Declined
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contacted => "contacted",
            Self::Responded => "responded",
            Self::Negotiating => "negotiating",
            Self::Agreed => "agreed",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for EngagementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter dimension for every derived metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    #[default]
    All,
    Campaign(String),
}

impl Scope {
    pub const ALL: &'static str = "all";

    /// Whether a record carrying `campaign_id` is in scope. Records without
    /// a campaign reference only match `All`.
    pub fn matches(&self, campaign_id: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Campaign(id) => campaign_id == Some(id.as_str()),
        }
    }
}

impl FromStr for Scope {
    type Err = HudeyError;

    /// `all` selects every campaign; any other non-empty string is taken
    /// verbatim as a campaign id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(HudeyError::InvalidScope("scope must not be empty".into()));
        }
        if s == Self::ALL {
            Ok(Self::All)
        } else {
            Ok(Self::Campaign(s.to_string()))
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL),
            Self::Campaign(id) => f.write_str(id),
        }
    }
}

/// Per-campaign rollup row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetrics {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub creators: u64,
    pub responded: u64,
    pub agreed: u64,
    pub emails_sent: u64,
    pub open_rate: u32,
}

/// One creator's engagement within one campaign.
///
/// `responded` and `agreed` are display copies; rollups always derive them
/// from `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorEngagementRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: EngagementStatus,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub responded: bool,
    #[serde(default)]
    pub agreed: bool,
    #[serde(default)]
    pub response_time_hours: Option<f64>,
    #[serde(default)]
    pub has_proposal: bool,
    #[serde(default)]
    pub fee_gbp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeliverySummary {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub clicked: u64,
    #[serde(default)]
    pub bounced: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPerformanceRecord {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub posts_live: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub saves: u64,
    /// 0-100.
    #[serde(default)]
    pub compliance_score: f64,
    #[serde(default)]
    pub compliance_issues: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub agreed_fees: f64,
    #[serde(default)]
    pub creators_agreed: u64,
    #[serde(default)]
    pub total_engagements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStats {
    #[serde(default)]
    pub total_sent: u64,
    #[serde(default)]
    pub total_delivered: u64,
    #[serde(default)]
    pub total_opened: u64,
    #[serde(default)]
    pub total_clicked: u64,
    #[serde(default)]
    pub total_bounced: u64,
    #[serde(default)]
    pub delivery_rate: u32,
    #[serde(default)]
    pub open_rate: u32,
    #[serde(default)]
    pub click_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationStats {
    #[serde(default)]
    pub active_negotiations: u64,
    #[serde(default)]
    pub avg_response_time_hours: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBreakdown {
    pub platform: String,
    pub creators: u64,
    pub responded: u64,
    pub agreed: u64,
    pub declined: u64,
    pub response_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPerformance {
    #[serde(default)]
    pub total_posts_live: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub total_shares: u64,
    #[serde(default)]
    pub total_saves: u64,
    #[serde(default)]
    pub avg_compliance_score: f64,
    #[serde(default)]
    pub total_compliance_issues: u64,
    /// Not recomputed per scope.
    #[serde(default)]
    pub total_fully_compliant: u64,
    pub per_campaign: Vec<ContentPerformanceRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTracking {
    #[serde(default)]
    pub total_budget: f64,
    #[serde(default)]
    pub total_agreed_fees: f64,
    #[serde(default)]
    pub avg_cost_per_creator: f64,
    #[serde(default)]
    pub avg_cost_per_engagement: f64,
    pub per_campaign: Vec<BudgetRecord>,
}

/// Full analytics payload for one brand. Record lists are required; the
/// scalar rollups default to zero and are recomputed by derivation anyway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub total_campaigns: u64,
    #[serde(default)]
    pub by_status: BTreeMap<CampaignStatus, u64>,
    #[serde(default)]
    pub total_creators_contacted: u64,
    #[serde(default)]
    pub total_agreed: u64,
    #[serde(default)]
    pub total_declined: u64,
    #[serde(default)]
    pub response_rate: u32,
    #[serde(default)]
    pub conversion_rate: u32,
    #[serde(default)]
    pub email_stats: EmailStats,
    pub per_campaign: Vec<CampaignMetrics>,
    pub email_breakdown: Vec<EmailDeliverySummary>,
    pub all_creators: Vec<CreatorEngagementRecord>,
    #[serde(default)]
    pub engagement_funnel: BTreeMap<EngagementStatus, u64>,
    #[serde(default)]
    pub negotiation_stats: NegotiationStats,
    #[serde(default)]
    pub platform_breakdown: Vec<PlatformBreakdown>,
    pub content_performance: ContentPerformance,
    pub budget_tracking: BudgetTracking,
}

impl AnalyticsSnapshot {
    pub fn from_json(json: &str) -> Result<Self, HudeyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn campaign(&self, id: &str) -> Option<&CampaignMetrics> {
        self.per_campaign.iter().find(|c| c.id == id)
    }
}
