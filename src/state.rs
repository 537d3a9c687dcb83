#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Application state as an immutable value.
//!
//! Every user or engine event is an [`Action`]; [`reduce`] returns the next
//! state and never touches the previous one.

use std::sync::Arc;

use crate::{
    report::{GradingReport, GradingResult, SortKey, SortPolicy},
    request::ClassInput,
};

/// Everything the front end displays.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Form contents.
    input:      ClassInput,
    /// Published spreadsheet address, if the instructor uses one.
    sheet_url:  String,
    /// Last successful report.
    report:     Option<Arc<GradingReport>>,
    /// Active roster ordering.
    sort:       SortPolicy,
    /// A grading request is outstanding.
    processing: bool,
    /// A sheet download is outstanding.
    fetching:   bool,
    /// Current status ticker line.
    status:     String,
    /// Message of the most recent failure.
    last_error: Option<String>,
    /// Row whose feedback was copied last.
    copied:     Option<usize>,
}

/// Events that move the state forward.
#[derive(Debug, Clone)]
pub enum Action {
    /// Rubric edited.
    SetMarkingGuide(String),
    /// Spreadsheet address edited.
    SetSheetUrl(String),
    /// Submission rows pasted.
    SetSheetData(String),
    /// Test image chosen or cleared.
    SetTestImage(Option<Vec<u8>>),
    /// Camera-visible roster edited.
    SetCamVisible(String),
    /// Camera-hidden roster edited.
    SetCamHidden(String),
    /// Praise roster edited.
    SetPraise(String),
    /// Sheet download began.
    SheetFetchStarted,
    /// Sheet download finished with this text.
    SheetFetched(String),
    /// Sheet download failed.
    SheetFetchFailed(String),
    /// Grading request sent.
    GradingStarted,
    /// Status ticker fired.
    StatusTick(String),
    /// Engine returned a report.
    GradingSucceeded(Arc<GradingReport>),
    /// Grading failed before or after contacting the engine.
    GradingFailed(String),
    /// Roster ordered by a different field.
    SortBy(SortKey),
    /// Roster direction flipped.
    ToggleSortOrder,
    /// Feedback for the row at this view position was copied.
    FeedbackCopied(usize),
    /// Error banner dismissed.
    ClearError,
}

impl AppState {
    /// Form contents.
    pub fn input(&self) -> &ClassInput {
        &self.input
    }

    /// Spreadsheet address.
    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    /// Last successful report.
    pub fn report(&self) -> Option<&Arc<GradingReport>> {
        self.report.as_ref()
    }

    /// Active ordering.
    pub fn sort(&self) -> SortPolicy {
        self.sort
    }

    /// Whether a grading request is outstanding. New requests are refused
    /// while this is set.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Whether a sheet download is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Current status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Most recent failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Row whose feedback was copied last.
    pub fn copied(&self) -> Option<usize> {
        self.copied
    }

    /// Results of the current report under the active ordering.
    pub fn view(&self) -> Vec<&GradingResult> {
        self.report
            .as_deref()
            .map(|report| self.sort.apply(report.results()))
            .unwrap_or_default()
    }
}

/// Computes the state that follows `action`.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::SetMarkingGuide(text) => next.input.marking_guide = text,
        Action::SetSheetUrl(url) => next.sheet_url = url,
        Action::SetSheetData(text) => next.input.sheet_data = text,
        Action::SetTestImage(image) => next.input.test_image = image,
        Action::SetCamVisible(text) => next.input.cam_visible_list = text,
        Action::SetCamHidden(text) => next.input.cam_hidden_list = text,
        Action::SetPraise(text) => next.input.praise_list = text,
        Action::SheetFetchStarted => {
            if !state.fetching {
                next.fetching = true;
                next.last_error = None;
            }
        }
        Action::SheetFetched(text) => {
            next.fetching = false;
            next.input.sheet_data = text;
        }
        Action::SheetFetchFailed(message) => {
            next.fetching = false;
            next.last_error = Some(message);
        }
        Action::GradingStarted => {
            if !state.processing {
                next.processing = true;
                next.status = String::new();
                next.last_error = None;
            }
        }
        Action::StatusTick(line) => {
            if state.processing {
                next.status = line;
            }
        }
        Action::GradingSucceeded(report) => {
            next.processing = false;
            next.status = String::new();
            next.report = Some(report);
            next.copied = None;
        }
        Action::GradingFailed(message) => {
            next.processing = false;
            next.status = String::new();
            next.last_error = Some(message);
        }
        Action::SortBy(key) => next.sort = state.sort.with_key(key),
        Action::ToggleSortOrder => next.sort = state.sort.toggled(),
        Action::FeedbackCopied(index) => next.copied = Some(index),
        Action::ClearError => next.last_error = None,
    }
    next
}
