use tally::{
    GradingResult,
    report::{
        CameraStatus, camera_status, is_praised,
        praise::{entry_within, roster_entries, roster_mentions},
    },
};

fn student(name: &str, first: &str) -> GradingResult {
    GradingResult::builder()
        .student_name(name)
        .first_name(first)
        .student_answer("42")
        .submission_time("20:00")
        .score(10.0)
        .feedback(["a", "b", "c", "d", "e"])
        .build()
}

#[test]
fn roster_entries_split_on_common_separators() {
    let entries = roster_entries("An, Minh Tuấn\nBình;  an \r\n");
    assert_eq!(entries, ["an", "minh tuấn", "bình"]);
}

#[test]
fn praise_matches_names_in_either_direction() {
    let roster = "An, Minh Tuấn";

    assert!(is_praised(roster, &student("Nguyễn Văn An", "An")));
    assert!(is_praised(roster, &student("Lê Minh Tuấn", "Tuấn")));
    // "An" is a substring of "Anh", so Anh is praised as well.
    assert!(is_praised(roster, &student("Trần Thị Anh", "Anh")));
    assert!(!is_praised(roster, &student("Phạm Bình", "Bình")));
}

#[test]
fn entries_are_only_searched_in_the_given_name() {
    let roster = "An, Minh Tuấn";

    // "thanh" contains "an", but only the given name is searched for entries.
    assert!(!is_praised(roster, &student("Trần Thanh Hương", "Hương")));
    assert!(entry_within(roster, "Anh"));
    assert!(!entry_within(roster, "  "));
    assert_eq!(
        camera_status("", roster, &student("Trần Thanh Hương", "Hương")),
        CameraStatus::Unclear
    );
}

#[test]
fn matching_ignores_case() {
    assert!(roster_mentions("NGUYỄN VĂN AN", "nguyễn văn an"));
    assert!(roster_mentions("lê minh tuấn", "Tuấn"));
}

#[test]
fn blank_names_and_rosters_never_match() {
    assert!(!roster_mentions("An, Bình", ""));
    assert!(!roster_mentions("An, Bình", "   "));
    assert!(!is_praised("", &student("Nguyễn Văn An", "An")));
    assert!(!is_praised(" , ;\n", &student("Nguyễn Văn An", "An")));
}

#[test]
fn camera_status_prefers_the_visible_roster() {
    let visible = "Nguyễn Văn An";
    let hidden = "Lê Minh Tuấn, Nguyễn Văn An";

    assert_eq!(
        camera_status(visible, hidden, &student("Nguyễn Văn An", "An")),
        CameraStatus::Visible
    );
    assert_eq!(
        camera_status(visible, hidden, &student("Lê Minh Tuấn", "Tuấn")),
        CameraStatus::Hidden
    );
    assert_eq!(
        camera_status(visible, hidden, &student("Phạm Bình", "Bình")),
        CameraStatus::Unclear
    );
}
