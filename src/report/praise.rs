#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Roster lookups for the participation bonus and the camera templates.
//!
//! Matching is case-insensitive *substring* matching. A student is on a
//! roster when their full or given name occurs in the roster text, or when
//! one of the roster's entries occurs in their given name. A short entry
//! such as "An" therefore also matches the given name "Anh". Entries are
//! never searched for inside the full name, so "An" does not pick up
//! "Trần Thanh Hương".

use itertools::Itertools;

use super::model::GradingResult;

/// Which of the three camera templates applies to a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStatus {
    /// Camera on, screen and notebook visible.
    Visible,
    /// Camera off.
    Hidden,
    /// Not on either roster, or the picture was not usable.
    Unclear,
}

impl CameraStatus {
    /// Short label shown on the feedback card.
    pub fn label(&self) -> &'static str {
        match self {
            CameraStatus::Visible => "Bật cam",
            CameraStatus::Hidden => "Không bật cam",
            CameraStatus::Unclear => "Chưa rõ",
        }
    }
}

/// Splits roster text on newlines, commas and semicolons, dropping blanks.
pub fn roster_entries(roster: &str) -> Vec<String> {
    roster
        .split(['\n', '\r', ',', ';'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_lowercase)
        .unique()
        .collect()
}

/// Whether `name` occurs in the roster text, ignoring case.
///
/// An empty or blank name never matches.
pub fn roster_mentions(roster: &str, name: &str) -> bool {
    let name = name.trim().to_lowercase();
    !name.is_empty() && roster.to_lowercase().contains(&name)
}

/// Whether any roster entry occurs in the given name `first_name`.
pub fn entry_within(roster: &str, first_name: &str) -> bool {
    let first_name = first_name.trim().to_lowercase();
    !first_name.is_empty()
        && roster_entries(roster)
            .iter()
            .any(|entry| first_name.contains(entry.as_str()))
}

/// Whether the student is on `roster` by full or given name.
fn on_roster(roster: &str, result: &GradingResult) -> bool {
    roster_mentions(roster, result.student_name())
        || roster_mentions(roster, result.first_name())
        || entry_within(roster, result.first_name())
}

/// Whether the student should show the participation bonus marker.
pub fn is_praised(praise_list: &str, result: &GradingResult) -> bool {
    on_roster(praise_list, result)
}

/// Camera template for a student. The visible roster is checked first.
pub fn camera_status(cam_visible: &str, cam_hidden: &str, result: &GradingResult) -> CameraStatus {
    if on_roster(cam_visible, result) {
        CameraStatus::Visible
    } else if on_roster(cam_hidden, result) {
        CameraStatus::Hidden
    } else {
        CameraStatus::Unclear
    }
}
