#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Prompt assets embedded in the binary.

/// Status lines cycled while the engine is working.
pub const STATUS_MESSAGES: [&str; 6] = [
    "Đang nhận diện cấu trúc TSV/Tab...",
    "Đang ánh xạ cột dữ liệu học sinh...",
    "Đang tái cấu trúc bài làm viết tay...",
    "Đang nháp ngầm & Tính toán lại...",
    "Đang rà soát sai sót & Đối chiếu...",
    "Đang hoàn thiện nhận xét cá nhân hóa...",
];

/// Prompt templates for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingPrompts {
    /// System instruction sent with every request.
    system_instruction: String,
    /// Lines shown by the status ticker.
    status_messages:    Vec<String>,
}

impl Default for GradingPrompts {
    fn default() -> Self {
        Self {
            system_instruction: include_str!("prompts/system_instruction.md").to_string(),
            status_messages:    STATUS_MESSAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GradingPrompts {
    /// Returns the system instruction.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Returns the status ticker lines.
    pub fn status_messages(&self) -> &[String] {
        &self.status_messages
    }
}
