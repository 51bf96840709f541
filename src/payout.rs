use crate::config::PayoutConfig;
use crate::models::{PayoutResult, Tier};
use crate::scoring::{round2, FinalScore};

/// Share of the maximum payout a tier can ever earn.
pub fn tier_cap(tier: Tier) -> f64 {
    match tier {
        Tier::None => 0.0,
        Tier::Low => 0.15,
        Tier::Medium => 0.40,
        Tier::High => 1.00,
    }
}

/// Payout per 1k views for an unrounded overall score.
///
/// Scores above the threshold are mapped onto [0, 1] and squared; the result
/// is bounded by the tier cap so a borderline video cannot earn the next
/// tier's money through the curve alone.
pub fn compute_payout(overall_score: f64, tier: Tier, config: &PayoutConfig) -> f64 {
    let max = config.max_payout_per_1k_views;
    let threshold = config.min_payout_threshold;

    if overall_score < threshold || tier == Tier::None {
        return 0.0;
    }

    let x = (overall_score - threshold) / (100.0 - threshold);
    let curve = x * x;
    let payout = (max * tier_cap(tier)).min(max * curve);
    round2(payout)
}

pub fn payout_result(score: &FinalScore, config: &PayoutConfig) -> PayoutResult {
    PayoutResult {
        video_grade: score.tier,
        payout: compute_payout(score.overall, score.tier, config),
        overall_score: score.breakdown.overall,
        max_payout_per_1k_views: config.max_payout_per_1k_views,
        min_payout_threshold: config.min_payout_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tier_for;
    use proptest::prelude::*;

    fn payout(overall: f64, tier: Tier) -> f64 {
        compute_payout(overall, tier, &PayoutConfig::default())
    }

    #[test]
    fn nothing_below_threshold() {
        for tier in [Tier::None, Tier::Low, Tier::Medium, Tier::High] {
            assert_eq!(payout(39.99, tier), 0.0);
        }
        assert_eq!(payout(40.0, Tier::Low), 0.0);
    }

    #[test]
    fn tier_none_earns_nothing() {
        assert_eq!(payout(95.0, Tier::None), 0.0);
    }

    #[test]
    fn tier_caps_bind_before_the_curve() {
        assert_eq!(payout(100.0, Tier::Low), 0.15);
        assert_eq!(payout(100.0, Tier::Medium), 0.40);
        assert_eq!(payout(100.0, Tier::High), 1.0);
    }

    #[test]
    fn curve_binds_when_below_cap() {
        // x = 30 / 60 = 0.5, curve = 0.25
        assert_eq!(payout(70.0, Tier::Medium), 0.25);
        // x = 40 / 60, curve = 0.444..
        assert_eq!(payout(80.0, Tier::High), 0.44);
        // x = 15 / 60, curve = 0.0625 rounds to 0.06
        assert_eq!(payout(55.0, Tier::Low), 0.06);
    }

    #[test]
    fn configured_maximum_scales_payout() {
        let config = PayoutConfig {
            max_payout_per_1k_views: 4.0,
            min_payout_threshold: 40.0,
        };
        assert_eq!(compute_payout(100.0, Tier::High, &config), 4.0);
        assert_eq!(compute_payout(100.0, Tier::Low, &config), 0.6);
    }

    proptest! {
        #[test]
        fn monotonic_for_fixed_tier(a in 0.0f64..=100.0, b in 0.0f64..=100.0, tier_idx in 0usize..4) {
            let tier = [Tier::None, Tier::Low, Tier::Medium, Tier::High][tier_idx];
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(payout(lo, tier) <= payout(hi, tier));
        }

        #[test]
        fn bounded_by_zero_and_max(overall in 0.0f64..=100.0) {
            let tier = tier_for(overall);
            let value = payout(overall, tier);
            prop_assert!(value >= 0.0);
            prop_assert!(value <= PayoutConfig::default().max_payout_per_1k_views);
        }
    }
}
