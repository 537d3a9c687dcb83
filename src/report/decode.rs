#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Turns the engine's raw payload into a [`GradingReport`].
//!
//! Request-level problems (not JSON, no `answerKey`/`results`) are errors.
//! Row-level problems are repaired or the row is dropped, and a warning is
//! appended so one bad row never voids the rest of the class.

use serde_json::{Map, Value};

use super::{
    model::{FEEDBACK_LINES, GradingReport, GradingResult, MAX_SCORE, MIN_SCORE, Rank},
    sort::SortPolicy,
};
use crate::error::{EngineError, RowWarning};

/// Knobs for the row validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Flag fractional scores with a warning.
    pub strict_integer_scores: bool,
}

/// Parses and validates a raw engine payload.
pub fn decode_report(payload: &str, options: DecodeOptions) -> Result<GradingReport, EngineError> {
    let value: Value = serde_json::from_str(payload.trim())
        .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;
    decode_value(value, options)
}

/// Validates an already parsed payload.
pub fn decode_value(value: Value, options: DecodeOptions) -> Result<GradingReport, EngineError> {
    let Value::Object(mut root) = value else {
        return Err(EngineError::SchemaViolation("top level is not an object".into()));
    };

    let answer_key = match root.remove("answerKey") {
        Some(Value::String(text)) => text,
        Some(_) => return Err(EngineError::SchemaViolation("`answerKey` is not text".into())),
        None => return Err(EngineError::SchemaViolation("missing `answerKey`".into())),
    };
    let rows = match root.remove("results") {
        Some(Value::Array(rows)) => rows,
        Some(_) => return Err(EngineError::SchemaViolation("`results` is not a list".into())),
        None => return Err(EngineError::SchemaViolation("missing `results`".into())),
    };

    let mut engine_warnings = Vec::new();
    let mut found = Vec::new();
    match root.remove("validationWarnings") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Value::String(text) => engine_warnings.push(text),
                    _ => found.push(RowWarning::UnreadableEngineWarning { index }),
                }
            }
        }
        Some(_) => found.push(RowWarning::EngineWarningsNotAList),
    }

    let received = rows.len();
    let mut results: Vec<GradingResult> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| decode_row(index, row, options, &mut found))
        .collect();

    let policy = SortPolicy::default();
    results.sort_by(|a, b| policy.compare(a, b));

    tracing::debug!(
        "Decoded {} of {} result rows with {} local warning(s)",
        results.len(),
        received,
        found.len()
    );

    engine_warnings.extend(found.iter().map(ToString::to_string));
    Ok(GradingReport::new(answer_key, results, engine_warnings))
}

/// Takes a non-blank string field, recording `key` when it is unusable.
fn take_text(
    row: &mut Map<String, Value>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match row.remove(key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => {
            missing.push(key);
            None
        }
    }
}

/// Takes a string field that may be blank, such as `rank`.
fn take_label(
    row: &mut Map<String, Value>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match row.remove(key) {
        Some(Value::String(text)) => Some(text),
        _ => {
            missing.push(key);
            None
        }
    }
}

/// Takes the numeric score.
fn take_score(row: &mut Map<String, Value>, missing: &mut Vec<&'static str>) -> Option<f64> {
    match row.remove("score").as_ref().and_then(Value::as_f64) {
        Some(score) if score.is_finite() => Some(score),
        _ => {
            missing.push("score");
            None
        }
    }
}

/// Takes a non-empty list of feedback strings.
fn take_feedback(
    row: &mut Map<String, Value>,
    missing: &mut Vec<&'static str>,
) -> Option<Vec<String>> {
    let lines = match row.remove("feedback") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::String(line) => Some(line),
                _ => None,
            })
            .collect::<Option<Vec<String>>>(),
        _ => None,
    };
    if lines.is_none() {
        missing.push("feedback");
    }
    lines
}

/// Validates one element of `results`.
///
/// Absent, `null`, blank and wrongly typed fields are all treated as missing.
/// A blank `rank` is the one exception: it means no distinction.
fn decode_row(
    index: usize,
    row: Value,
    options: DecodeOptions,
    warnings: &mut Vec<RowWarning>,
) -> Option<GradingResult> {
    let Value::Object(mut row) = row else {
        tracing::warn!("Dropping results[{index}]: not an object");
        warnings.push(RowWarning::NotAnObject { index });
        return None;
    };

    let mut missing = Vec::new();
    let student_name = take_text(&mut row, "studentName", &mut missing);
    let first_name = take_text(&mut row, "firstName", &mut missing);
    let student_answer = take_text(&mut row, "studentAnswer", &mut missing);
    let submission_time = take_text(&mut row, "submissionTime", &mut missing);
    let score = take_score(&mut row, &mut missing);
    let rank = take_label(&mut row, "rank", &mut missing);
    let feedback = take_feedback(&mut row, &mut missing);

    let (
        Some(student_name),
        Some(first_name),
        Some(student_answer),
        Some(submission_time),
        Some(raw_score),
        Some(rank),
        Some(feedback),
    ) = (student_name, first_name, student_answer, submission_time, score, rank, feedback)
    else {
        tracing::warn!("Dropping results[{index}]: missing {}", missing.join(", "));
        warnings.push(RowWarning::MissingFields {
            index,
            fields: missing,
        });
        return None;
    };

    if options.strict_integer_scores && raw_score.fract() != 0.0 {
        warnings.push(RowWarning::NonIntegerScore {
            student: student_name.clone(),
            raw:     raw_score,
        });
    }

    let score = raw_score.clamp(MIN_SCORE, MAX_SCORE);
    if score != raw_score {
        warnings.push(RowWarning::ScoreOutOfRange {
            student: student_name.clone(),
            raw:     raw_score,
            clamped: score,
        });
    }

    if feedback.len() < FEEDBACK_LINES {
        warnings.push(RowWarning::ShortFeedback {
            student: student_name.clone(),
            count:   feedback.len(),
        });
    }

    Some(GradingResult {
        student_name,
        first_name,
        student_answer,
        submission_time,
        score,
        rank: Rank::from_label(&rank),
        feedback,
    })
}
