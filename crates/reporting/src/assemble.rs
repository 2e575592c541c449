//! Dashboard assembly from raw per-campaign data.
//!
//! Each [`CampaignSource`] bundles the rows the backend keeps for one
//! campaign: the campaign itself, its email delivery summary (or the raw
//! email events it is built from), creator engagements and the
//! post-monitoring summary. [`assemble_dashboard`]
//! flattens them into the per-campaign record lists and then computes the
//! brand-wide rollups with the same code path as scope filtering.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use hudey_core::rates::{percent, round_to};
use hudey_core::types::{
    AnalyticsSnapshot, BudgetRecord, CampaignMetrics, CampaignStatus, ContentPerformanceRecord,
    CreatorEngagementRecord, EmailDeliverySummary, EngagementStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::content::total_engagements;
use crate::delivery::{delivery_summary, EmailEventRow, RecipientDelivery};
use crate::funnel::UNKNOWN_PLATFORM;
use crate::scope::aggregate;

const DEFAULT_CAMPAIGN_NAME: &str = "Campaign";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSource {
    pub campaign: CampaignRow,
    /// Precomputed delivery summary. Takes precedence over `email_events`.
    #[serde(default)]
    pub email: Option<DeliverySummaryRow>,
    #[serde(default)]
    pub email_events: Vec<EmailEventRow>,
    #[serde(default)]
    pub engagements: Vec<EngagementRow>,
    #[serde(default)]
    pub monitor: Option<MonitorSummaryRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub brief: Option<CampaignBrief>,
}

/// The parts of a campaign brief the dashboard reads. Briefs are free-form
/// documents, so the budget is kept as raw JSON and only used when numeric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignBrief {
    #[serde(default)]
    pub budget_gbp: Option<Value>,
}

impl CampaignBrief {
    pub fn budget(&self) -> f64 {
        self.budget_gbp.as_ref().and_then(Value::as_f64).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliverySummaryRow {
    #[serde(default)]
    pub total_sent: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub clicked: u64,
    #[serde(default)]
    pub bounced: u64,
    #[serde(default)]
    pub per_creator: Vec<RecipientDelivery>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementRow {
    #[serde(default)]
    pub creator_id: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub creator_email: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: Option<EngagementStatus>,
    /// Agreed terms, free-form.
    #[serde(default)]
    pub terms: Option<Value>,
    /// Latest proposal, free-form.
    #[serde(default)]
    pub latest_proposal: Option<Value>,
    #[serde(default)]
    pub response_timestamp: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl EngagementRow {
    pub fn status(&self) -> EngagementStatus {
        self.status.unwrap_or_default()
    }

    /// Agreed fee if the terms carry a numeric `fee_gbp`, otherwise the
    /// proposed fee from the latest proposal.
    pub fn fee_gbp(&self) -> Option<f64> {
        numeric_fee(self.terms.as_ref()).or_else(|| numeric_fee(self.latest_proposal.as_ref()))
    }

    pub fn has_proposal(&self) -> bool {
        match &self.latest_proposal {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(_)) => true,
        }
    }

    /// Hours between outreach and the creator's reply, to one decimal.
    /// `None` when either timestamp is missing or unparseable, when one
    /// carries a UTC offset and the other does not, or when the reply does
    /// not come after the outreach.
    pub fn response_time_hours(&self) -> Option<f64> {
        let replied = parse_timestamp(self.response_timestamp.as_deref()?);
        let created = parse_timestamp(self.created_at.as_deref()?);
        let gap = match (replied, created) {
            (Ok(Timestamp::Offset(replied)), Ok(Timestamp::Offset(created))) => replied - created,
            (Ok(Timestamp::Naive(replied)), Ok(Timestamp::Naive(created))) => replied - created,
            (Ok(_), Ok(_)) => {
                debug!(creator_id = %self.creator_id, "Engagement timestamps mix offset and local time");
                return None;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(creator_id = %self.creator_id, error = %e, "Unparseable engagement timestamp");
                return None;
            }
        };
        let seconds = gap.num_seconds();
        (seconds > 0).then(|| round_to(seconds as f64 / 3600.0, 1))
    }

    fn platform(&self) -> String {
        match self.platform.as_deref() {
            Some(p) if !p.is_empty() => p.to_lowercase(),
            _ => UNKNOWN_PLATFORM.to_string(),
        }
    }
}

enum Timestamp {
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

/// ISO 8601 with an offset, or without one in `T` or space separated form.
fn parse_timestamp(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Timestamp::Offset(ts));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(Timestamp::Naive)
}

fn numeric_fee(doc: Option<&Value>) -> Option<f64> {
    match doc?.get("fee_gbp")? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorSummaryRow {
    #[serde(default)]
    pub posts_live: u64,
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
    pub compliance_issues: u64,
    #[serde(default)]
    pub fully_compliant: u64,
}

/// Build the brand-wide dashboard snapshot from raw campaign data.
pub fn assemble_dashboard(sources: &[CampaignSource]) -> AnalyticsSnapshot {
    let mut per_campaign = Vec::with_capacity(sources.len());
    let mut email_breakdown = Vec::with_capacity(sources.len());
    let mut all_creators = Vec::new();
    let mut content_records = Vec::with_capacity(sources.len());
    let mut budget_records = Vec::with_capacity(sources.len());
    let mut total_fully_compliant = 0u64;

    for source in sources {
        let cid = source.campaign.id.clone();
        let cname = source
            .campaign
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_CAMPAIGN_NAME.to_string());
        let email = source
            .email
            .clone()
            .unwrap_or_else(|| delivery_summary(&source.email_events));
        let monitor = source.monitor.clone().unwrap_or_default();

        let engagements = &source.engagements;
        let responded = engagements.iter().filter(|e| e.status().has_responded()).count() as u64;
        let agreed = engagements.iter().filter(|e| e.status().is_agreed()).count() as u64;

        per_campaign.push(CampaignMetrics {
            id: cid.clone(),
            name: cname.clone(),
            status: source.campaign.status.unwrap_or_default(),
            creators: engagements.len() as u64,
            responded,
            agreed,
            emails_sent: email.total_sent,
            open_rate: percent(email.opened, email.total_sent),
        });

        email_breakdown.push(EmailDeliverySummary {
            campaign_id: Some(cid.clone()),
            campaign_name: cname.clone(),
            sent: email.total_sent,
            delivered: email.delivered,
            opened: email.opened,
            clicked: email.clicked,
            bounced: email.bounced,
        });

        for row in engagements {
            let status = row.status();
            all_creators.push(CreatorEngagementRecord {
                id: row.creator_id.clone(),
                name: row
                    .creator_name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| row.creator_id.clone()),
                email: row.creator_email.clone().unwrap_or_default(),
                platform: Some(row.platform()),
                status,
                campaign_id: Some(cid.clone()),
                campaign_name: cname.clone(),
                responded: status.has_responded(),
                agreed: status.is_agreed(),
                response_time_hours: row.response_time_hours(),
                has_proposal: row.has_proposal(),
                fee_gbp: row.fee_gbp(),
            });
        }

        let content = ContentPerformanceRecord {
            campaign_id: Some(cid.clone()),
            campaign_name: cname.clone(),
            posts_live: monitor.posts_live,
            likes: monitor.total_likes,
            comments: monitor.total_comments,
            shares: monitor.total_shares,
            saves: monitor.total_saves,
            compliance_score: monitor.avg_compliance_score,
            compliance_issues: monitor.compliance_issues,
        };
        total_fully_compliant += monitor.fully_compliant;

        let agreed_fees: f64 = engagements
            .iter()
            .filter(|e| e.status().is_agreed())
            .filter_map(EngagementRow::fee_gbp)
            .sum();

        budget_records.push(BudgetRecord {
            campaign_id: Some(cid.clone()),
            campaign_name: cname,
            budget: source.campaign.brief.as_ref().map(CampaignBrief::budget).unwrap_or(0.0),
            agreed_fees,
            creators_agreed: agreed,
            total_engagements: total_engagements(&content),
        });
        content_records.push(content);

        debug!(campaign_id = %cid, creators = engagements.len(), "Campaign folded into dashboard");
    }

    aggregate(
        per_campaign,
        email_breakdown,
        all_creators,
        &content_records,
        &budget_records,
        total_fully_compliant,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sources() -> Vec<CampaignSource> {
        serde_json::from_value(json!([
            {
                "campaign": {
                    "id": "cmp-1", "name": "Campaign Alpha", "status": "completed",
                    "brief": {"budget_gbp": 2000, "brand_name": "Alpha"}
                },
                "email": {"total_sent": 5, "delivered": 4, "opened": 3, "clicked": 1, "bounced": 0},
                "engagements": [
                    {
                        "creator_id": "cr-1", "creator_name": "Alice", "creator_email": "alice@test.com",
                        "platform": "instagram", "status": "agreed",
                        "terms": {"fee_gbp": 500}, "latest_proposal": null,
                        "response_timestamp": "2025-01-02T12:00:00Z", "created_at": "2025-01-01T12:00:00Z"
                    },
                    {
                        "creator_id": "cr-2", "creator_name": "Bob", "creator_email": "bob@test.com",
                        "platform": "tiktok", "status": "contacted",
                        "terms": null, "latest_proposal": null,
                        "response_timestamp": null, "created_at": "2025-01-01T12:00:00Z"
                    }
                ],
                "monitor": {
                    "posts_live": 2, "total_likes": 300, "total_comments": 40,
                    "total_shares": 10, "total_saves": 5,
                    "avg_compliance_score": 85.0, "compliance_issues": 1, "fully_compliant": 1
                }
            },
            {
                "campaign": {
                    "id": "cmp-2", "name": "Campaign Beta", "status": "running",
                    "brief": {"budget_gbp": 1000, "brand_name": "Beta"}
                },
                "email": {"total_sent": 5, "delivered": 4, "opened": 3, "clicked": 1, "bounced": 0},
                "engagements": [],
                "monitor": null
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_dashboard_returns_aggregated_data() {
        let snap = assemble_dashboard(&sources());

        assert_eq!(snap.total_campaigns, 2);
        assert_eq!(snap.total_creators_contacted, 2);
        assert_eq!(snap.total_agreed, 1);
        assert_eq!(snap.total_declined, 0);
        assert_eq!(snap.response_rate, 50);
        assert_eq!(snap.conversion_rate, 50);

        assert_eq!(snap.email_stats.total_sent, 10);
        assert_eq!(snap.email_stats.open_rate, 60);

        assert_eq!(snap.per_campaign.len(), 2);
        assert_eq!(snap.per_campaign[0].id, "cmp-1");
        assert_eq!(snap.per_campaign[0].open_rate, 60);

        assert_eq!(snap.all_creators.len(), 2);
        assert_eq!(snap.all_creators[0].name, "Alice");
        assert!(snap.all_creators[0].agreed);
        assert_eq!(snap.all_creators[0].fee_gbp, Some(500.0));
        assert_eq!(snap.all_creators[0].response_time_hours, Some(24.0));

        assert_eq!(snap.engagement_funnel.get(&EngagementStatus::Agreed), Some(&1));
        assert_eq!(snap.engagement_funnel.get(&EngagementStatus::Contacted), Some(&1));
        assert_eq!(snap.platform_breakdown.len(), 2);
        assert_eq!(snap.platform_breakdown[0].platform, "Instagram");

        assert_eq!(snap.content_performance.total_posts_live, 2);
        assert_eq!(snap.content_performance.total_likes, 300);
        assert_eq!(snap.content_performance.avg_compliance_score, 85.0);
        assert_eq!(snap.content_performance.total_fully_compliant, 1);

        assert_eq!(snap.budget_tracking.total_budget, 3000.0);
        assert_eq!(snap.budget_tracking.total_agreed_fees, 500.0);
        assert_eq!(snap.budget_tracking.avg_cost_per_creator, 500.0);
        assert_eq!(snap.budget_tracking.avg_cost_per_engagement, 1.41);
        assert_eq!(snap.negotiation_stats.avg_response_time_hours, 24);
    }

    #[test]
    fn test_fee_falls_back_to_proposal() {
        let row = EngagementRow {
            terms: Some(json!({"fee_gbp": "tbc"})),
            latest_proposal: Some(json!({"fee_gbp": 320.5, "deliverables": ["reel"]})),
            ..Default::default()
        };
        assert_eq!(row.fee_gbp(), Some(320.5));
        assert!(row.has_proposal());

        let no_fee = EngagementRow {
            terms: Some(json!("verbal agreement")),
            latest_proposal: Some(json!({})),
            ..Default::default()
        };
        assert_eq!(no_fee.fee_gbp(), None);
        assert!(!no_fee.has_proposal());
    }

    #[test]
    fn test_response_time_requires_positive_gap() {
        let row = EngagementRow {
            created_at: Some("2025-01-02T00:00:00Z".into()),
            response_timestamp: Some("2025-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(row.response_time_hours(), None);

        let bad = EngagementRow {
            created_at: Some("yesterday".into()),
            response_timestamp: Some("2025-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(bad.response_time_hours(), None);

        let ok = EngagementRow {
            created_at: Some("2025-01-01T00:00:00Z".into()),
            response_timestamp: Some("2025-01-01T01:30:00+00:00".into()),
            ..Default::default()
        };
        assert_eq!(ok.response_time_hours(), Some(1.5));
    }

    #[test]
    fn test_response_time_without_offsets() {
        let naive = EngagementRow {
            created_at: Some("2025-01-01T00:00:00".into()),
            response_timestamp: Some("2025-01-01T10:00:00".into()),
            ..Default::default()
        };
        assert_eq!(naive.response_time_hours(), Some(10.0));

        let spaced = EngagementRow {
            created_at: Some("2025-01-01 00:00:00.250".into()),
            response_timestamp: Some("2025-01-01 02:15:00.250".into()),
            ..Default::default()
        };
        assert_eq!(spaced.response_time_hours(), Some(2.3));

        let mixed = EngagementRow {
            created_at: Some("2025-01-01T00:00:00".into()),
            response_timestamp: Some("2025-01-01T10:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(mixed.response_time_hours(), None);
    }

    #[test]
    fn test_email_summary_built_from_events() {
        let sources: Vec<CampaignSource> = serde_json::from_value(json!([
            {
                "campaign": {"id": "cmp-1", "name": "Alpha", "status": "running"},
                "email_events": [
                    {"email_id": "em-1", "event_type": "sent", "creator_id": "cr-1"},
                    {"email_id": "em-1", "event_type": "delivered", "creator_id": "cr-1"},
                    {"email_id": "em-1", "event_type": "opened", "creator_id": "cr-1"},
                    {"email_id": "em-2", "event_type": "sent", "creator_id": "cr-2"},
                    {"email_id": "em-2", "event_type": "delivered", "creator_id": "cr-2"}
                ]
            },
            {
                "campaign": {"id": "cmp-2", "name": "Beta"},
                "email": {"total_sent": 4, "delivered": 4, "opened": 1, "clicked": 0, "bounced": 0},
                "email_events": [
                    {"email_id": "em-9", "event_type": "sent", "creator_id": "cr-9"}
                ]
            }
        ]))
        .unwrap();
        let snap = assemble_dashboard(&sources);

        assert_eq!(snap.email_breakdown[0].sent, 2);
        assert_eq!(snap.email_breakdown[0].delivered, 2);
        assert_eq!(snap.email_breakdown[0].opened, 1);
        assert_eq!(snap.per_campaign[0].open_rate, 50);
        assert_eq!(snap.email_breakdown[1].sent, 4);
        assert_eq!(snap.email_stats.total_sent, 6);
        assert_eq!(snap.email_stats.delivery_rate, 100);
    }

    #[test]
    fn test_defaults_for_sparse_rows() {
        let sources: Vec<CampaignSource> = serde_json::from_value(json!([
            {"campaign": {"id": "cmp-9", "brief": {"budget_gbp": "lots"}},
             "engagements": [{"creator_id": "cr-9", "platform": "YouTube"}]}
        ]))
        .unwrap();
        let snap = assemble_dashboard(&sources);

        assert_eq!(snap.per_campaign[0].name, "Campaign");
        assert_eq!(snap.per_campaign[0].status, CampaignStatus::Draft);
        assert_eq!(snap.all_creators[0].name, "cr-9");
        assert_eq!(snap.all_creators[0].status, EngagementStatus::Contacted);
        assert_eq!(snap.all_creators[0].platform.as_deref(), Some("youtube"));
        assert_eq!(snap.budget_tracking.total_budget, 0.0);
        assert_eq!(snap.email_stats.delivery_rate, 0);
    }
}
