//! Scope-filtered recomputation of the analytics dashboard.
//!
//! [`derive`] narrows a full [`AnalyticsSnapshot`] to one campaign (or
//! keeps everything for [`Scope::All`]) and rebuilds every rollup from the
//! records that remain. Additive fields of a campaign scope and its
//! complement always sum to the unfiltered total; rates are recomputed per
//! scope and are therefore not additive.

use std::collections::BTreeMap;

use hudey_core::rates::{mean, percent, round_half_up};
use hudey_core::types::{
    AnalyticsSnapshot, BudgetRecord, CampaignMetrics, CampaignStatus, ContentPerformanceRecord,
    CreatorEngagementRecord, EmailDeliverySummary, EmailStats, EngagementStatus, NegotiationStats,
    Scope,
};

use crate::budget::budget_tracking;
use crate::content::content_performance;
use crate::funnel::{engagement_funnel, platform_breakdown, stage_count};

/// Recompute `snapshot` restricted to `scope`. The input is never mutated.
pub fn derive(snapshot: &AnalyticsSnapshot, scope: &Scope) -> AnalyticsSnapshot {
    let per_campaign: Vec<CampaignMetrics> = snapshot
        .per_campaign
        .iter()
        .filter(|c| scope.matches(Some(&c.id)))
        .cloned()
        .collect();

    aggregate(
        per_campaign,
        in_scope(&snapshot.email_breakdown, scope, |r| r.campaign_id.as_deref()),
        in_scope(&snapshot.all_creators, scope, |r| r.campaign_id.as_deref()),
        &in_scope(&snapshot.content_performance.per_campaign, scope, |r| {
            r.campaign_id.as_deref()
        }),
        &in_scope(&snapshot.budget_tracking.per_campaign, scope, |r| {
            r.campaign_id.as_deref()
        }),
        snapshot.content_performance.total_fully_compliant,
    )
}

/// Build a snapshot whose every rollup is computed from the given records.
pub(crate) fn aggregate(
    per_campaign: Vec<CampaignMetrics>,
    email_breakdown: Vec<EmailDeliverySummary>,
    all_creators: Vec<CreatorEngagementRecord>,
    content_records: &[ContentPerformanceRecord],
    budget_records: &[BudgetRecord],
    total_fully_compliant: u64,
) -> AnalyticsSnapshot {
    let contacted = all_creators.len() as u64;
    let responded = count_where(&all_creators, EngagementStatus::has_responded);
    let agreed = count_where(&all_creators, EngagementStatus::is_agreed);
    let declined = count_where(&all_creators, EngagementStatus::is_declined);

    let engagement_funnel = engagement_funnel(&all_creators);
    let negotiation_stats = NegotiationStats {
        active_negotiations: stage_count(&engagement_funnel, EngagementStatus::Negotiating),
        avg_response_time_hours: avg_response_time_hours(&all_creators),
    };

    AnalyticsSnapshot {
        total_campaigns: per_campaign.len() as u64,
        by_status: campaigns_by_status(&per_campaign),
        total_creators_contacted: contacted,
        total_agreed: agreed,
        total_declined: declined,
        response_rate: percent(responded, contacted),
        conversion_rate: percent(agreed, contacted),
        email_stats: email_stats(&email_breakdown),
        platform_breakdown: platform_breakdown(&all_creators),
        engagement_funnel,
        negotiation_stats,
        content_performance: content_performance(content_records, total_fully_compliant),
        budget_tracking: budget_tracking(budget_records),
        per_campaign,
        email_breakdown,
        all_creators,
    }
}

/// Sum delivery counters and express rates against emails sent.
pub fn email_stats(records: &[EmailDeliverySummary]) -> EmailStats {
    let sent: u64 = records.iter().map(|r| r.sent).sum();
    let delivered: u64 = records.iter().map(|r| r.delivered).sum();
    let opened: u64 = records.iter().map(|r| r.opened).sum();
    let clicked: u64 = records.iter().map(|r| r.clicked).sum();
    let bounced: u64 = records.iter().map(|r| r.bounced).sum();

    EmailStats {
        total_sent: sent,
        total_delivered: delivered,
        total_opened: opened,
        total_clicked: clicked,
        total_bounced: bounced,
        delivery_rate: percent(delivered, sent),
        open_rate: percent(opened, sent),
        click_rate: percent(clicked, sent),
    }
}

fn campaigns_by_status(campaigns: &[CampaignMetrics]) -> BTreeMap<CampaignStatus, u64> {
    let mut by_status = BTreeMap::new();
    for campaign in campaigns {
        *by_status.entry(campaign.status).or_insert(0) += 1;
    }
    by_status
}

fn avg_response_time_hours(creators: &[CreatorEngagementRecord]) -> u64 {
    let times: Vec<f64> = creators
        .iter()
        .filter_map(|c| c.response_time_hours)
        .filter(|t| t.is_finite())
        .collect();
    mean(&times).map(|m| round_half_up(m) as u64).unwrap_or(0)
}

fn count_where(creators: &[CreatorEngagementRecord], pred: fn(EngagementStatus) -> bool) -> u64 {
    creators.iter().filter(|c| pred(c.status)).count() as u64
}

fn in_scope<T: Clone>(records: &[T], scope: &Scope, campaign_of: impl Fn(&T) -> Option<&str>) -> Vec<T> {
    records
        .iter()
        .filter(|r| scope.matches(campaign_of(r)))
        .cloned()
        .collect()
}
