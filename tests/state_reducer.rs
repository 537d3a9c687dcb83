use std::sync::Arc;

use tally::{
    GradingReport, GradingResult,
    report::{SortKey, SortOrder},
    state::{Action, AppState, reduce},
};

fn report(names: &[(&str, f64)]) -> Arc<GradingReport> {
    let results = names
        .iter()
        .map(|(name, score)| {
            GradingResult::builder()
                .student_name(*name)
                .first_name(*name)
                .student_answer("42")
                .submission_time("20:00")
                .score(*score)
                .feedback(["a", "b", "c", "d", "e"])
                .build()
        })
        .collect();
    Arc::new(GradingReport::new("key", results, vec![]))
}

fn apply(state: &AppState, actions: impl IntoIterator<Item = Action>) -> AppState {
    actions
        .into_iter()
        .fold(state.clone(), |acc, action| reduce(&acc, action))
}

#[test]
fn form_edits_land_in_the_input() {
    let state = apply(
        &AppState::default(),
        [
            Action::SetMarkingGuide("rubric".into()),
            Action::SetSheetData("rows".into()),
            Action::SetPraise("An".into()),
            Action::SetTestImage(Some(vec![1, 2, 3])),
        ],
    );

    assert_eq!(state.input().marking_guide(), "rubric");
    assert_eq!(state.input().sheet_data(), "rows");
    assert_eq!(state.input().praise_list(), "An");
    assert_eq!(state.input().test_image(), Some(&[1u8, 2, 3][..]));

    let cleared = reduce(&state, Action::SetTestImage(None));
    assert!(cleared.input().test_image().is_none());
}

#[test]
fn reduce_leaves_the_previous_state_alone() {
    let before = AppState::default();
    let after = reduce(&before, Action::GradingStarted);

    assert!(!before.is_processing());
    assert!(after.is_processing());
}

#[test]
fn second_start_is_ignored_while_processing() {
    let started = apply(
        &AppState::default(),
        [Action::GradingStarted, Action::StatusTick("đang chấm".into())],
    );
    let again = reduce(&started, Action::GradingStarted);

    assert!(again.is_processing());
    assert_eq!(again.status(), "đang chấm");
}

#[test]
fn status_ticks_after_completion_are_ignored() {
    let done = apply(
        &AppState::default(),
        [
            Action::GradingStarted,
            Action::StatusTick("one".into()),
            Action::GradingSucceeded(report(&[("An", 9.0)])),
            Action::StatusTick("late".into()),
        ],
    );

    assert!(!done.is_processing());
    assert_eq!(done.status(), "");
    assert_eq!(done.report().map(|r| r.results().len()), Some(1));
}

#[test]
fn failure_keeps_the_previous_report() {
    let first = report(&[("An", 9.0), ("Bình", 7.0)]);
    let state = apply(
        &AppState::default(),
        [
            Action::GradingStarted,
            Action::GradingSucceeded(Arc::clone(&first)),
            Action::GradingStarted,
            Action::GradingFailed("thử lại".into()),
        ],
    );

    assert!(!state.is_processing());
    assert_eq!(state.last_error(), Some("thử lại"));
    assert!(state.report().is_some_and(|r| Arc::ptr_eq(r, &first)));

    let cleared = reduce(&state, Action::ClearError);
    assert!(cleared.last_error().is_none());
}

#[test]
fn view_follows_the_sort_actions() {
    let state = apply(
        &AppState::default(),
        [
            Action::GradingStarted,
            Action::GradingSucceeded(report(&[("Bình", 7.0), ("An", 9.0), ("Chi", 8.0)])),
            Action::SortBy(SortKey::Score),
        ],
    );
    let names = |s: &AppState| -> Vec<String> {
        s.view().iter().map(|r| r.first_name().to_string()).collect()
    };

    assert_eq!(names(&state), ["Bình", "Chi", "An"]);

    let flipped = reduce(&state, Action::ToggleSortOrder);
    assert_eq!(flipped.sort().order(), SortOrder::Descending);
    assert_eq!(names(&flipped), ["An", "Chi", "Bình"]);

    let back = reduce(&flipped, Action::ToggleSortOrder);
    assert_eq!(names(&back), names(&state));
}

#[test]
fn sheet_fetch_lifecycle() {
    let state = apply(
        &AppState::default(),
        [
            Action::SetSheetUrl("https://example.com/pubhtml".into()),
            Action::SheetFetchStarted,
        ],
    );
    assert!(state.is_fetching());

    let fetched = reduce(&state, Action::SheetFetched("a,b".into()));
    assert!(!fetched.is_fetching());
    assert_eq!(fetched.input().sheet_data(), "a,b");

    let failed = reduce(&state, Action::SheetFetchFailed("lỗi".into()));
    assert!(!failed.is_fetching());
    assert_eq!(failed.last_error(), Some("lỗi"));
    assert_eq!(failed.input().sheet_data(), "");
}

#[test]
fn copied_marker_resets_with_a_new_report() {
    let state = apply(
        &AppState::default(),
        [Action::FeedbackCopied(2), Action::GradingStarted],
    );
    assert_eq!(state.copied(), Some(2));

    let graded = reduce(&state, Action::GradingSucceeded(report(&[("An", 9.0)])));
    assert_eq!(graded.copied(), None);
}
