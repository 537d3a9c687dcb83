use serde_json::json;
use tally::{
    ClassInput,
    report::{DecodeOptions, SortKey, SortOrder, SortPolicy, decode_value, render_report},
};

fn sample() -> tally::GradingReport {
    let row = |name: &str, first: &str, score: i64, rank: &str| {
        json!({
            "studentName": name,
            "firstName": first,
            "studentAnswer": "42",
            "submissionTime": "20:00",
            "score": score,
            "rank": rank,
            "feedback": ["đúng", "luyện thêm", "camera rõ", "tích cực", "chúc con"],
        })
    };
    decode_value(
        json!({
            "answerKey": "Đáp án: 42",
            "validationWarnings": ["Dòng 4 trùng tên"],
            "results": [
                row("Lê Thị Bình", "Bình", 7, "Khuyến khích"),
                row("Nguyễn Văn An", "An", 10, "Nhất"),
            ],
        }),
        DecodeOptions::default(),
    )
    .expect("decode sample")
}

#[test]
fn rendered_report_lists_everything() {
    colored::control::set_override(false);
    let rosters = ClassInput::builder()
        .praise_list("An")
        .cam_visible_list("Nguyễn Văn An")
        .cam_hidden_list("Lê Thị Bình")
        .build();
    let text = render_report(&sample(), SortPolicy::default(), &rosters);

    assert!(text.contains("Dòng 4 trùng tên"));
    assert!(text.contains("Đáp án: 42"));
    assert!(text.contains("Nguyễn Văn An"));
    assert!(text.contains("+1"));
    assert!(text.contains("[KẾT QUẢ] đúng"));
    assert!(text.contains("[LỜI CHÚC] chúc con"));
    assert!(text.contains("Điểm TB: 8.50"));
    assert!(text.contains("Nguyễn Văn An (10/10) Nhất | Camera: Bật cam"));
    assert!(text.contains("Lê Thị Bình (7/10) Khuyến khích | Camera: Không bật cam"));
}

#[test]
fn feedback_cards_follow_the_policy() {
    colored::control::set_override(false);
    let report = sample();

    let rosters = ClassInput::default();

    let by_name = render_report(&report, SortPolicy::default(), &rosters);
    let an = by_name.find("1. Nguyễn Văn An").expect("An listed first by name");
    let binh = by_name.find("2. Lê Thị Bình").expect("Bình listed second");
    assert!(an < binh);

    let by_score = render_report(
        &report,
        SortPolicy::new(SortKey::Score, SortOrder::Ascending),
        &rosters,
    );
    assert!(by_score.contains("1. Lê Thị Bình (7/10)"));
    assert!(!by_score.contains("+1"));
    assert!(by_score.contains("Camera: Chưa rõ"));
}
