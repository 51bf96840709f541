use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GraderConfig;
use crate::error::GradeResult;
use crate::models::{QualityScores, Tier};
use crate::payout::compute_payout;
use crate::scoring::compute_final_score;

/// One pre-recorded assessment. Empty cells fall back to the usual defaults.
#[derive(Debug, Deserialize)]
struct CsvRow {
    video_id: String,
    hook: Option<f64>,
    retention: Option<f64>,
    clarity: Option<f64>,
    usefulness_originality: Option<f64>,
    audience_specific_value: Option<f64>,
    engagement: Option<f64>,
    ai_generated: Option<bool>,
    compliance_risk: Option<f64>,
    critical_violation: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ScoredRow {
    video_id: String,
    base: f64,
    penalty: f64,
    bonus_niche: f64,
    bonus_aigc: f64,
    overall: f64,
    tier: Tier,
    payout: f64,
}

pub fn score_csv(input: &Path, output: &Path, config: &GraderConfig) -> GradeResult<usize> {
    let reader = std::fs::File::open(input)?;
    let writer = std::fs::File::create(output)?;
    score_records(reader, writer, config)
}

pub fn score_records<R: Read, W: Write>(
    input: R,
    output: W,
    config: &GraderConfig,
) -> GradeResult<usize> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    let mut scored = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let scores = QualityScores {
            hook: row.hook.unwrap_or(0.0),
            retention: row.retention.unwrap_or(0.0),
            clarity: row.clarity.unwrap_or(0.0),
            usefulness_originality: row.usefulness_originality.unwrap_or(0.0),
            audience_specific_value: row.audience_specific_value.unwrap_or(0.0),
            engagement: row.engagement.unwrap_or(0.0),
        };
        let score = compute_final_score(
            &scores,
            row.compliance_risk.unwrap_or(0.0),
            row.ai_generated.unwrap_or(false),
            row.critical_violation.unwrap_or(false),
            &config.weights,
        );
        let payout = compute_payout(score.overall, score.tier, &config.payout);
        debug!(video_id = %row.video_id, tier = %score.tier, payout, "scored row");

        writer.serialize(ScoredRow {
            video_id: row.video_id,
            base: score.breakdown.base,
            penalty: score.breakdown.penalty,
            bonus_niche: score.breakdown.bonus_niche,
            bonus_aigc: score.breakdown.bonus_aigc,
            overall: score.breakdown.overall,
            tier: score.tier,
            payout,
        })?;
        scored += 1;
    }

    writer.flush()?;
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GradeError;

    const HEADER: &str = "video_id,hook,retention,clarity,usefulness_originality,audience_specific_value,engagement,ai_generated,compliance_risk,critical_violation\n";

    fn run(body: &str) -> GradeResult<(usize, String)> {
        let mut out = Vec::new();
        let count = score_records(
            format!("{HEADER}{body}").as_bytes(),
            &mut out,
            &GraderConfig::default(),
        )?;
        Ok((count, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn scores_each_row() {
        let (count, csv) = run(
            "v1,1,1,1,1,1,1,false,0,false\n\
             v2,1,1,1,1,1,1,true,0,true\n\
             v3,,,,,,,,,\n",
        )
        .unwrap();
        assert_eq!(count, 3);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "video_id,base,penalty,bonus_niche,bonus_aigc,overall,tier,payout"
        );
        assert!(lines[1].starts_with("v1,100.0,0.0,6.0,0.0,100.0,high,1.0"));
        assert!(lines[2].ends_with(",0.0,none,0.0"));
        assert_eq!(lines[3], "v3,0.0,0.0,0.0,0.0,0.0,none,0.0");
    }

    #[test]
    fn bad_cells_are_reported() {
        let err = run("v1,high,1,1,1,1,1,false,0,false\n").unwrap_err();
        assert!(matches!(err, GradeError::Csv(_)));
    }
}
