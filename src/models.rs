use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The six content-quality dimensions, each in [0, 1] once normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub hook: f64,
    pub retention: f64,
    pub clarity: f64,
    pub usefulness_originality: f64,
    pub audience_specific_value: f64,
    pub engagement: f64,
}

impl QualityScores {
    pub const DIMENSIONS: [&'static str; 6] = [
        "hook",
        "retention",
        "clarity",
        "usefulness_originality",
        "audience_specific_value",
        "engagement",
    ];

    /// Same dimensions with every value clamped to [0, 1].
    pub fn clamped(&self) -> Self {
        Self {
            hook: clamp_unit(self.hook),
            retention: clamp_unit(self.retention),
            clarity: clamp_unit(self.clarity),
            usefulness_originality: clamp_unit(self.usefulness_originality),
            audience_specific_value: clamp_unit(self.audience_specific_value),
            engagement: clamp_unit(self.engagement),
        }
    }

    pub fn set(&mut self, dimension: &str, value: f64) {
        let slot = match dimension {
            "hook" => &mut self.hook,
            "retention" => &mut self.retention,
            "clarity" => &mut self.clarity,
            "usefulness_originality" => &mut self.usefulness_originality,
            "audience_specific_value" => &mut self.audience_specific_value,
            "engagement" => &mut self.engagement,
            _ => return,
        };
        *slot = value;
    }
}

/// Clamp to [0, 1]; NaN counts as 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub timestamp: String,
    pub issue: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub summary: String,
    pub scores: QualityScores,
    pub ai_generated: bool,
    pub issues: Vec<Issue>,
    pub actionable_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub timestamp: String,
    pub flag: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub regulatory_flags: String,
    pub critical_violation: bool,
    pub compliance_risk: f64,
    pub violations: Vec<Violation>,
}

impl Default for ComplianceAssessment {
    fn default() -> Self {
        Self {
            regulatory_flags: "none".to_string(),
            critical_violation: false,
            compliance_risk: 0.0,
            violations: Vec::new(),
        }
    }
}

impl ComplianceAssessment {
    /// Individual flags from the pipe-separated field, without "none".
    pub fn flag_list(&self) -> Vec<String> {
        self.regulatory_flags
            .split('|')
            .map(|flag| flag.trim().to_ascii_lowercase())
            .filter(|flag| !flag.is_empty() && flag != "none")
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    None,
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported score components, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub penalty: f64,
    pub bonus_niche: f64,
    pub bonus_aigc: f64,
    pub overall: f64,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutResult {
    pub video_grade: Tier,
    pub payout: f64,
    pub overall_score: f64,
    pub max_payout_per_1k_views: f64,
    pub min_payout_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub request_id: Uuid,
    pub graded_at: DateTime<Utc>,
    pub model: String,
    pub evaluation: QualityAssessment,
    pub compliance: ComplianceAssessment,
    pub calculation: ScoreBreakdown,
    pub payout: PayoutResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_list_skips_none_and_blanks() {
        let compliance = ComplianceAssessment {
            regulatory_flags: " Misinformation | none || financial_fraud ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            compliance.flag_list(),
            vec!["misinformation".to_string(), "financial_fraud".to_string()]
        );
        assert!(ComplianceAssessment::default().flag_list().is_empty());
    }

    #[test]
    fn tiers_serialize_lowercase() {
        let json = serde_json::to_string(&[Tier::None, Tier::Medium]).unwrap();
        assert_eq!(json, r#"["none","medium"]"#);
    }

    #[test]
    fn clamped_bounds_every_dimension() {
        let scores = QualityScores {
            hook: -0.5,
            retention: 1.7,
            clarity: 0.4,
            ..Default::default()
        }
        .clamped();
        assert_eq!(scores.hook, 0.0);
        assert_eq!(scores.retention, 1.0);
        assert_eq!(scores.clarity, 0.4);
    }
}
