use serde_json::{Map, Number, Value};

use crate::error::{GradeError, GradeResult};
use crate::models::{
    clamp_unit, ComplianceAssessment, Issue, QualityAssessment, QualityScores, Violation,
};

const QUALITY: &str = "quality";
const COMPLIANCE: &str = "compliance";

/// Remove a surrounding code fence (optionally tagged `json`).
pub fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = trimmed.trim_matches(|c: char| c == '`' || c.is_whitespace());
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim(),
        _ => inner,
    }
}

/// Parse model text as a JSON object.
pub fn parse_model_json(kind: &'static str, text: &str) -> GradeResult<Map<String, Value>> {
    let body = strip_fence(text);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(GradeError::malformed(
            kind,
            format!("expected a JSON object, got {}", type_name(&other)),
        )),
        Err(e) => Err(GradeError::malformed(kind, e.to_string())),
    }
}

pub fn normalize_quality(text: &str) -> GradeResult<QualityAssessment> {
    quality_from_map(&parse_model_json(QUALITY, text)?)
}

pub fn normalize_compliance(text: &str) -> GradeResult<ComplianceAssessment> {
    compliance_from_map(&parse_model_json(COMPLIANCE, text)?)
}

pub fn quality_from_map(map: &Map<String, Value>) -> GradeResult<QualityAssessment> {
    let mut scores = QualityScores::default();
    match map.get("scores") {
        None | Some(Value::Null) => {}
        Some(Value::Object(raw)) => {
            for dimension in QualityScores::DIMENSIONS {
                let field = format!("scores.{dimension}");
                let value = coerce_f64(QUALITY, &field, raw.get(dimension))?.unwrap_or(0.0);
                scores.set(dimension, clamp_unit(value));
            }
        }
        Some(other) => {
            return Err(GradeError::malformed(
                QUALITY,
                format!("`scores` must be an object, got {}", type_name(other)),
            ))
        }
    }

    let issues = coerce_records(QUALITY, "issues", map.get("issues"))?
        .into_iter()
        .map(|(index, item)| -> GradeResult<Issue> {
            let field = |name: &str| format!("issues[{index}].{name}");
            Ok(Issue {
                timestamp: coerce_text(QUALITY, &field("timestamp"), item.get("timestamp"))?,
                issue: coerce_text(QUALITY, &field("issue"), item.get("issue"))?,
                description: coerce_text(QUALITY, &field("description"), item.get("description"))?,
            })
        })
        .collect::<GradeResult<Vec<_>>>()?;

    let actionable_tips = match map.get("actionable_tips") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(tips)) => tips
            .iter()
            .enumerate()
            .map(|(i, tip)| coerce_text(QUALITY, &format!("actionable_tips[{i}]"), Some(tip)))
            .collect::<GradeResult<Vec<_>>>()?
            .into_iter()
            .filter(|tip| !tip.is_empty())
            .collect(),
        Some(other) => {
            return Err(GradeError::malformed(
                QUALITY,
                format!("`actionable_tips` must be a list, got {}", type_name(other)),
            ))
        }
    };

    Ok(QualityAssessment {
        summary: coerce_text(QUALITY, "summary", map.get("summary"))?,
        scores,
        ai_generated: coerce_bool(QUALITY, "ai_generated", map.get("ai_generated"))?
            .unwrap_or(false),
        issues,
        actionable_tips,
    })
}

pub fn compliance_from_map(map: &Map<String, Value>) -> GradeResult<ComplianceAssessment> {
    let flags = coerce_text(COMPLIANCE, "regulatory_flags", map.get("regulatory_flags"))?;
    let regulatory_flags = if flags.is_empty() {
        "none".to_string()
    } else {
        flags
    };

    let violations = coerce_records(COMPLIANCE, "violations", map.get("violations"))?
        .into_iter()
        .map(|(index, item)| -> GradeResult<Violation> {
            let field = |name: &str| format!("violations[{index}].{name}");
            Ok(Violation {
                timestamp: coerce_text(COMPLIANCE, &field("timestamp"), item.get("timestamp"))?,
                flag: coerce_text(COMPLIANCE, &field("flag"), item.get("flag"))?,
                description: coerce_text(
                    COMPLIANCE,
                    &field("description"),
                    item.get("description"),
                )?,
            })
        })
        .collect::<GradeResult<Vec<_>>>()?;

    let risk = coerce_f64(COMPLIANCE, "compliance_risk", map.get("compliance_risk"))?;

    Ok(ComplianceAssessment {
        regulatory_flags,
        critical_violation: coerce_bool(
            COMPLIANCE,
            "critical_violation",
            map.get("critical_violation"),
        )?
        .unwrap_or(false),
        compliance_risk: clamp_unit(risk.unwrap_or(0.0)),
        violations,
    })
}

fn coerce_f64(kind: &'static str, field: &str, value: Option<&Value>) -> GradeResult<Option<f64>> {
    let number = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => number_f64(n),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => {
            return Err(GradeError::malformed(
                kind,
                format!("`{field}` must be a number, got {}", type_name(other)),
            ))
        }
    };
    // infinities are kept so the caller's clamp pins them to a bound
    match number {
        Some(n) if !n.is_nan() => Ok(Some(n)),
        _ => Err(GradeError::malformed(
            kind,
            format!("`{field}` is not a number"),
        )),
    }
}

/// Literals past f64 range keep their text, so they overflow to ±inf here.
fn number_f64(n: &Number) -> Option<f64> {
    n.as_f64().or_else(|| n.to_string().parse().ok())
}

fn coerce_bool(kind: &'static str, field: &str, value: Option<&Value>) -> GradeResult<Option<bool>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::Number(n)) => Ok(Some(number_f64(n).map_or(false, |n| n != 0.0))),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => Err(GradeError::malformed(
                kind,
                format!("`{field}` must be a boolean, got {s:?}"),
            )),
        },
        Some(other) => Err(GradeError::malformed(
            kind,
            format!("`{field}` must be a boolean, got {}", type_name(other)),
        )),
    }
}

fn coerce_text(kind: &'static str, field: &str, value: Option<&Value>) -> GradeResult<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(GradeError::malformed(
            kind,
            format!("`{field}` must be text, got {}", type_name(other)),
        )),
    }
}

/// A list of objects; a missing or null list is empty.
fn coerce_records<'a>(
    kind: &'static str,
    field: &str,
    value: Option<&'a Value>,
) -> GradeResult<Vec<(usize, &'a Map<String, Value>)>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok((index, record)),
                other => Err(GradeError::malformed(
                    kind,
                    format!("`{field}[{index}]` must be an object, got {}", type_name(other)),
                )),
            })
            .collect(),
        Some(other) => Err(GradeError::malformed(
            kind,
            format!("`{field}` must be a list, got {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
