#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of feedback lines every result is expected to carry.
pub const FEEDBACK_LINES: usize = 5;

/// Highest score a student can be given.
pub const MAX_SCORE: f64 = 10.0;

/// Lowest score a student can be given.
pub const MIN_SCORE: f64 = 0.0;

/// Distinction awarded to a student.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Rank {
    /// "Nhất"
    First,
    /// "Nhì"
    Second,
    /// "Ba"
    Third,
    /// "Khuyến khích"
    HonorableMention,
    /// Anything else the engine sent; no distinction.
    None(String),
    /// Empty label.
    #[default]
    Unranked,
}

impl Rank {
    /// Maps the engine's label onto a rank. Unknown labels are kept verbatim.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Nhất" => Rank::First,
            "Nhì" => Rank::Second,
            "Ba" => Rank::Third,
            "Khuyến khích" => Rank::HonorableMention,
            "" => Rank::Unranked,
            _ => Rank::None(label.to_string()),
        }
    }

    /// The label as the engine spells it.
    pub fn label(&self) -> &str {
        match self {
            Rank::First => "Nhất",
            Rank::Second => "Nhì",
            Rank::Third => "Ba",
            Rank::HonorableMention => "Khuyến khích",
            Rank::None(label) => label,
            Rank::Unranked => "",
        }
    }

    /// Whether this rank is one of the four distinctions.
    pub fn is_distinction(&self) -> bool {
        !matches!(self, Rank::None(_) | Rank::Unranked)
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Rank::from_label(&label))
    }
}

/// Semantic slot of a feedback line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCategory {
    /// What the student got right or wrong.
    Result,
    /// What the parent should do next.
    Action,
    /// Camera participation.
    Camera,
    /// Chat interaction.
    Interaction,
    /// Closing wish.
    ClosingWish,
    /// Anything past the fifth line.
    Note,
}

impl FeedbackCategory {
    /// The five expected categories, in order.
    pub const ORDERED: [FeedbackCategory; FEEDBACK_LINES] = [
        FeedbackCategory::Result,
        FeedbackCategory::Action,
        FeedbackCategory::Camera,
        FeedbackCategory::Interaction,
        FeedbackCategory::ClosingWish,
    ];

    /// Category of the line at `index`; `Note` past the fifth line.
    pub fn for_index(index: usize) -> Self {
        Self::ORDERED
            .get(index)
            .copied()
            .unwrap_or(FeedbackCategory::Note)
    }

    /// Heading shown next to the line.
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackCategory::Result => "KẾT QUẢ",
            FeedbackCategory::Action => "HÀNH ĐỘNG",
            FeedbackCategory::Camera => "CAMERA",
            FeedbackCategory::Interaction => "TƯƠNG TÁC",
            FeedbackCategory::ClosingWish => "LỜI CHÚC",
            FeedbackCategory::Note => "GHI CHÚ",
        }
    }
}

/// One graded student row.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct GradingResult {
    /// Full display name.
    #[builder(getter)]
    pub(crate) student_name:    String,
    /// Given name, used for sorting.
    #[builder(getter)]
    pub(crate) first_name:      String,
    /// Reconstructed submission.
    #[builder(getter)]
    pub(crate) student_answer:  String,
    /// Submission time as it appeared in the sheet.
    #[builder(getter)]
    pub(crate) submission_time: String,
    /// Score in `[0, 10]`.
    #[builder(getter)]
    pub(crate) score:           f64,
    /// Distinction label.
    #[builder(default)]
    #[builder(getter)]
    pub(crate) rank:            Rank,
    /// Feedback lines in category order.
    #[builder(with = |iter: impl IntoIterator<Item = impl Into<String>>| {
        iter.into_iter().map(Into::into).collect::<Vec<String>>()
    })]
    pub(crate) feedback:        Vec<String>,
}

impl GradingResult {
    /// Full display name.
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Reconstructed submission.
    pub fn student_answer(&self) -> &str {
        &self.student_answer
    }

    /// Submission time text.
    pub fn submission_time(&self) -> &str {
        &self.submission_time
    }

    /// Score after clamping.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Distinction label.
    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    /// Raw feedback lines.
    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    /// Feedback lines paired with the category they render under.
    ///
    /// A short list simply yields fewer pairs; missing categories are left
    /// out rather than filled in.
    pub fn feedback_lines(&self) -> impl Iterator<Item = (FeedbackCategory, &str)> {
        self.feedback
            .iter()
            .enumerate()
            .map(|(i, line)| (FeedbackCategory::for_index(i), line.as_str()))
    }

    /// Feedback joined by newlines, the way it is copied and exported.
    pub fn feedback_text(&self) -> String {
        self.feedback.join("\n")
    }
}

/// A complete graded report as returned by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingReport {
    /// Worked solution.
    pub(crate) answer_key:          String,
    /// One entry per student.
    pub(crate) results:             Vec<GradingResult>,
    /// Data problems reported by the engine or found while decoding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) validation_warnings: Vec<String>,
}

impl GradingReport {
    /// Creates a report from already validated parts.
    pub fn new(
        answer_key: impl Into<String>,
        results: Vec<GradingResult>,
        validation_warnings: Vec<String>,
    ) -> Self {
        Self {
            answer_key: answer_key.into(),
            results,
            validation_warnings,
        }
    }

    /// Worked solution.
    pub fn answer_key(&self) -> &str {
        &self.answer_key
    }

    /// Results in the order they were stored.
    pub fn results(&self) -> &[GradingResult] {
        &self.results
    }

    /// All warnings, engine-reported first.
    pub fn validation_warnings(&self) -> &[String] {
        &self.validation_warnings
    }

    /// Whether no student rows survived.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
