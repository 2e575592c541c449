//! Budget tracking: spend committed to creators against campaign budgets.

use hudey_core::rates::{ratio, round_half_up, round_to};
use hudey_core::types::{BudgetRecord, BudgetTracking};

/// Roll per-campaign budget records up into the dashboard totals.
///
/// `avg_cost_per_creator` is `agreed fees / creators agreed` rounded to a
/// whole amount; `avg_cost_per_engagement` is `agreed fees / total
/// engagements` rounded to two decimals. Both are 0 on a zero denominator.
pub fn budget_tracking(records: &[BudgetRecord]) -> BudgetTracking {
    let total_budget: f64 = records.iter().map(|r| r.budget).sum();
    let total_agreed_fees: f64 = records.iter().map(|r| r.agreed_fees).sum();
    let creators_agreed: u64 = records.iter().map(|r| r.creators_agreed).sum();
    let engagements: u64 = records.iter().map(|r| r.total_engagements).sum();

    BudgetTracking {
        total_budget,
        total_agreed_fees,
        avg_cost_per_creator: round_half_up(ratio(total_agreed_fees, creators_agreed as f64)),
        avg_cost_per_engagement: round_to(ratio(total_agreed_fees, engagements as f64), 2),
        per_campaign: records.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, budget: f64, fees: f64, agreed: u64, engagements: u64) -> BudgetRecord {
        BudgetRecord {
            campaign_id: Some(id.into()),
            campaign_name: id.to_uppercase(),
            budget,
            agreed_fees: fees,
            creators_agreed: agreed,
            total_engagements: engagements,
        }
    }

    #[test]
    fn test_budget_totals_and_averages() {
        let records = vec![
            record("cmp-1", 2000.0, 500.0, 1, 355),
            record("cmp-2", 1000.0, 250.0, 2, 0),
        ];
        let tracking = budget_tracking(&records);
        assert!((tracking.total_budget - 3000.0).abs() < f64::EPSILON);
        assert!((tracking.total_agreed_fees - 750.0).abs() < f64::EPSILON);
        assert_eq!(tracking.avg_cost_per_creator, 250.0);
        assert_eq!(tracking.avg_cost_per_engagement, 2.11);
        assert_eq!(tracking.per_campaign.len(), 2);
    }

    #[test]
    fn test_zero_denominators() {
        let tracking = budget_tracking(&[record("cmp-1", 500.0, 0.0, 0, 0)]);
        assert_eq!(tracking.avg_cost_per_creator, 0.0);
        assert_eq!(tracking.avg_cost_per_engagement, 0.0);

        let empty = budget_tracking(&[]);
        assert_eq!(empty.total_budget, 0.0);
        assert!(empty.per_campaign.is_empty());
    }
}
