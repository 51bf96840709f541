use crate::config::ScoreWeights;
use crate::models::{clamp_unit, QualityScores, ScoreBreakdown, Tier};

const RISK_PENALTY_FACTOR: f64 = 0.60;
const NICHE_THRESHOLD: f64 = 0.7;
const NICHE_MULTIPLIER: f64 = 20.0;
const NICHE_BONUS_CAP: f64 = 10.0;
const AIGC_BONUS: f64 = 5.0;
const AIGC_MIN_ORIGINALITY: f64 = 0.8;
const AIGC_MIN_CLARITY: f64 = 0.8;

/// Result of scoring one video. `overall` is unrounded; `breakdown` holds
/// the rounded values that get reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalScore {
    pub overall: f64,
    pub tier: Tier,
    pub breakdown: ScoreBreakdown,
}

pub fn compute_final_score(
    scores: &QualityScores,
    compliance_risk: f64,
    ai_generated: bool,
    critical_violation: bool,
    weights: &ScoreWeights,
) -> FinalScore {
    let s = scores.clamped();
    let risk = clamp_unit(compliance_risk);

    let base = 100.0
        * (weights.hook * s.hook
            + weights.retention * s.retention
            + weights.clarity * s.clarity
            + weights.usefulness_originality * s.usefulness_originality
            + weights.audience_specific_value * s.audience_specific_value
            + weights.engagement * s.engagement);

    let penalty = 100.0 * risk.powi(2) * RISK_PENALTY_FACTOR;
    let bonus_niche = niche_bonus(s.audience_specific_value);
    let bonus_aigc = if ai_generated
        && s.usefulness_originality >= AIGC_MIN_ORIGINALITY
        && s.clarity >= AIGC_MIN_CLARITY
    {
        AIGC_BONUS
    } else {
        0.0
    };

    let mut overall = (base - penalty + bonus_niche + bonus_aigc).clamp(0.0, 100.0);
    let mut tier = tier_for(overall);

    if critical_violation {
        overall = 0.0;
        tier = Tier::None;
    }

    FinalScore {
        overall,
        tier,
        breakdown: ScoreBreakdown {
            base: round2(base),
            penalty: round2(penalty),
            bonus_niche: round2(bonus_niche),
            bonus_aigc: round2(bonus_aigc),
            overall: round2(overall),
            tier,
        },
    }
}

pub fn niche_bonus(audience_specific_value: f64) -> f64 {
    (NICHE_MULTIPLIER * (audience_specific_value - NICHE_THRESHOLD)).clamp(0.0, NICHE_BONUS_CAP)
}

/// Tier for an overall score; each threshold belongs to the higher tier.
pub fn tier_for(overall: f64) -> Tier {
    match overall {
        o if o < 40.0 => Tier::None,
        o if o < 60.0 => Tier::Low,
        o if o < 80.0 => Tier::Medium,
        _ => Tier::High,
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
