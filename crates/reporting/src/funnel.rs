//! Engagement funnel and per-platform outreach breakdown.

use hudey_core::rates::percent;
use hudey_core::types::{CreatorEngagementRecord, EngagementStatus, PlatformBreakdown};
use std::collections::{BTreeMap, HashMap};

pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Count engagements per status. Only statuses that occur are present.
pub fn engagement_funnel(creators: &[CreatorEngagementRecord]) -> BTreeMap<EngagementStatus, u64> {
    let mut funnel = BTreeMap::new();
    for creator in creators {
        *funnel.entry(creator.status).or_insert(0) += 1;
    }
    funnel
}

/// Count of one funnel stage, 0 when absent.
pub fn stage_count(funnel: &BTreeMap<EngagementStatus, u64>, status: EngagementStatus) -> u64 {
    funnel.get(&status).copied().unwrap_or(0)
}

#[derive(Debug, Default)]
struct PlatformCounts {
    creators: u64,
    responded: u64,
    agreed: u64,
    declined: u64,
}

/// Group engagements by platform, most creators first. Ties keep the order
/// in which platforms were first seen.
pub fn platform_breakdown(creators: &[CreatorEngagementRecord]) -> Vec<PlatformBreakdown> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, PlatformCounts)> = Vec::new();

    for creator in creators {
        let platform = match creator.platform.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => UNKNOWN_PLATFORM,
        };
        let slot = *index.entry(platform).or_insert_with(|| {
            groups.push((platform, PlatformCounts::default()));
            groups.len() - 1
        });

        let counts = &mut groups[slot].1;
        counts.creators += 1;
        if creator.status.has_responded() {
            counts.responded += 1;
        }
        if creator.status.is_agreed() {
            counts.agreed += 1;
        }
        if creator.status.is_declined() {
            counts.declined += 1;
        }
    }

    let mut breakdown: Vec<PlatformBreakdown> = groups
        .into_iter()
        .map(|(platform, c)| PlatformBreakdown {
            platform: capitalize(platform),
            creators: c.creators,
            responded: c.responded,
            agreed: c.agreed,
            declined: c.declined,
            response_rate: percent(c.responded, c.creators),
        })
        .collect();

    // sort_by is stable
    breakdown.sort_by(|a, b| b.creators.cmp(&a.creators));
    breakdown
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
