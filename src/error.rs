#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use async_openai::error::OpenAIError;

/// Suggestion shown to the user whenever the engine could not be reached.
pub const RETRY_HINT: &str = "Có lỗi xảy ra trong quá trình chấm bài. Vui lòng thử lại.";

/// Request-level failures. Any of these aborts the whole grading run.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Required inputs were missing, nothing was sent.
    #[error("Cannot start grading: {0}")]
    PreconditionFailed(String),
    /// The engine could not be reached or answered with a failure status.
    #[error("Grading engine request failed: {0}")]
    TransportFailure(String),
    /// The caller-imposed deadline elapsed before the engine answered.
    #[error("Grading engine did not answer within {0:?}")]
    Timeout(Duration),
    /// The payload was not valid JSON.
    #[error("Grading engine returned malformed JSON: {0}")]
    MalformedResponse(String),
    /// The payload parsed but lacks the required top-level structure.
    #[error("Grading engine response violates the report schema: {0}")]
    SchemaViolation(String),
}

impl EngineError {
    /// Message suitable for the person running the grader.
    ///
    /// Transport failures and timeouts share the generic retry hint; missing
    /// inputs are named.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::PreconditionFailed(_) => self.to_string(),
            EngineError::TransportFailure(_) | EngineError::Timeout(_) => RETRY_HINT.to_string(),
            EngineError::MalformedResponse(_) | EngineError::SchemaViolation(_) => {
                format!("{self}. {RETRY_HINT}")
            }
        }
    }

    /// Whether the failure happened before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, EngineError::PreconditionFailed(_))
    }
}

impl From<OpenAIError> for EngineError {
    fn from(err: OpenAIError) -> Self {
        EngineError::TransportFailure(err.to_string())
    }
}

/// A defect in one result row. Never fatal; rendered into
/// `validationWarnings`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RowWarning {
    /// The element at `index` was not an object.
    #[error("results[{index}]: entry is not an object; row dropped")]
    NotAnObject {
        /// Position in the received `results` array.
        index: usize,
    },
    /// Required fields were absent, empty or of the wrong type.
    #[error("results[{index}]: missing or invalid field(s) {}; row dropped", .fields.join(", "))]
    MissingFields {
        /// Position in the received `results` array.
        index:  usize,
        /// Offending field names, in schema order.
        fields: Vec<&'static str>,
    },
    /// Score fell outside `[0, 10]` and was clamped.
    #[error("{student}: score {raw} is outside 0-10, clamped to {clamped}")]
    ScoreOutOfRange {
        /// Student display name.
        student: String,
        /// Value sent by the engine.
        raw:     f64,
        /// Value kept in the report.
        clamped: f64,
    },
    /// Score is fractional while integer scores were requested.
    #[error("{student}: score {raw} is not a whole number")]
    NonIntegerScore {
        /// Student display name.
        student: String,
        /// Value sent by the engine.
        raw:     f64,
    },
    /// Fewer than five feedback lines were returned.
    #[error("{student}: only {count} of 5 feedback lines returned")]
    ShortFeedback {
        /// Student display name.
        student: String,
        /// Number of lines received.
        count:   usize,
    },
    /// `validationWarnings` held something other than text.
    #[error("validationWarnings[{index}] is not text; ignored")]
    UnreadableEngineWarning {
        /// Position in the received `validationWarnings` array.
        index: usize,
    },
    /// `validationWarnings` was present but not a list.
    #[error("validationWarnings is not a list; ignored")]
    EngineWarningsNotAList,
}
