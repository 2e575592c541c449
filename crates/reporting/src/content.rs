//! Content performance rollup from post monitoring.

use hudey_core::rates::{mean, round_to};
use hudey_core::types::{ContentPerformance, ContentPerformanceRecord};

/// Sum post metrics and average the compliance score of campaigns that
/// have at least one live post.
///
/// `total_fully_compliant` is passed through as given; monitoring only
/// reports it as a brand-wide figure.
pub fn content_performance(
    records: &[ContentPerformanceRecord],
    total_fully_compliant: u64,
) -> ContentPerformance {
    let scores: Vec<f64> = records
        .iter()
        .filter(|r| r.posts_live > 0)
        .map(|r| r.compliance_score)
        .collect();

    ContentPerformance {
        total_posts_live: records.iter().map(|r| r.posts_live).sum(),
        total_likes: records.iter().map(|r| r.likes).sum(),
        total_comments: records.iter().map(|r| r.comments).sum(),
        total_shares: records.iter().map(|r| r.shares).sum(),
        total_saves: records.iter().map(|r| r.saves).sum(),
        avg_compliance_score: mean(&scores).map(|m| round_to(m, 1)).unwrap_or(0.0),
        total_compliance_issues: records.iter().map(|r| r.compliance_issues).sum(),
        total_fully_compliant,
        per_campaign: records.to_vec(),
    }
}

/// Likes, comments, shares and saves of one record.
pub fn total_engagements(record: &ContentPerformanceRecord) -> u64 {
    record.likes + record.comments + record.shares + record.saves
}
