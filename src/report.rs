use std::fmt::Write;

use crate::models::GradeReport;

pub fn build_markdown(report: &GradeReport) -> String {
    let mut output = String::new();
    let evaluation = &report.evaluation;
    let compliance = &report.compliance;
    let calc = &report.calculation;
    let payout = &report.payout;

    let _ = writeln!(output, "# Video Grade Report");
    let _ = writeln!(
        output,
        "Graded {} with {} (request {})",
        report.graded_at.format("%Y-%m-%d %H:%M UTC"),
        report.model,
        report.request_id
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    if evaluation.summary.is_empty() {
        let _ = writeln!(output, "No summary provided.");
    } else {
        let _ = writeln!(output, "{}", evaluation.summary);
    }
    if evaluation.ai_generated {
        let _ = writeln!(output);
        let _ = writeln!(output, "_Flagged as AI-generated._");
    }

    let scores = &evaluation.scores;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Scores");
    let _ = writeln!(output, "| Dimension | Score |");
    let _ = writeln!(output, "|---|---|");
    for (name, value) in [
        ("Hook", scores.hook),
        ("Retention", scores.retention),
        ("Clarity", scores.clarity),
        ("Usefulness / originality", scores.usefulness_originality),
        ("Audience-specific value", scores.audience_specific_value),
        ("Engagement", scores.engagement),
    ] {
        let _ = writeln!(output, "| {} | {:.2} |", name, value);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Calculation");
    let _ = writeln!(output, "- Base: {:.2}", calc.base);
    let _ = writeln!(output, "- Risk penalty: -{:.2}", calc.penalty);
    let _ = writeln!(output, "- Niche bonus: +{:.2}", calc.bonus_niche);
    let _ = writeln!(output, "- AIGC bonus: +{:.2}", calc.bonus_aigc);
    let _ = writeln!(output, "- Overall: {:.2} ({})", calc.overall, calc.tier);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Compliance");
    let _ = writeln!(
        output,
        "Flags: {} | risk {:.2} | critical violation: {}",
        compliance.regulatory_flags,
        compliance.compliance_risk,
        if compliance.critical_violation { "yes" } else { "no" }
    );
    for violation in &compliance.violations {
        let _ = writeln!(
            output,
            "- [{}] {}: {}",
            violation.timestamp, violation.flag, violation.description
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Issues");
    if evaluation.issues.is_empty() {
        let _ = writeln!(output, "No issues reported.");
    } else {
        for issue in &evaluation.issues {
            let _ = writeln!(
                output,
                "- [{}] {}: {}",
                issue.timestamp, issue.issue, issue.description
            );
        }
    }

    if !evaluation.actionable_tips.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Tips");
        for tip in &evaluation.actionable_tips {
            let _ = writeln!(output, "- {}", tip);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Payout");
    let _ = writeln!(
        output,
        "{:.2} per 1k views (grade {}, score {:.2}; max {:.2}, threshold {:.1})",
        payout.payout,
        payout.video_grade,
        payout.overall_score,
        payout.max_payout_per_1k_views,
        payout.min_payout_threshold
    );

    output
}
