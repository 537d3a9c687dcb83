use std::fs;

use csv::ReaderBuilder;
use tally::{
    GradingResult,
    report::{
        Rank, SortKey, SortOrder, SortPolicy,
        export::{CSV_HEADERS, UTF8_BOM},
        to_csv, write_csv,
    },
};
use tempfile::TempDir;

fn result(name: &str, first: &str, answer: &str, score: f64) -> GradingResult {
    GradingResult::builder()
        .student_name(name)
        .first_name(first)
        .student_answer(answer)
        .submission_time("20:15")
        .score(score)
        .rank(Rank::Second)
        .feedback([
            "Con làm đúng \"bước 1\".",
            "Ba mẹ cho con luyện thêm.",
            "Camera rõ.",
            "Tương tác tốt.",
            "Chúc con học tốt!",
        ])
        .build()
}

fn parse(csv: &str) -> Vec<Vec<String>> {
    let body = csv.strip_prefix(UTF8_BOM).expect("csv starts with a BOM");
    ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body.as_bytes())
        .records()
        .map(|record| {
            record
                .expect("parse csv record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[test]
fn header_line_is_bare_and_preceded_by_bom() {
    let csv = to_csv(&[] as &[GradingResult]).expect("render empty csv");

    assert!(csv.starts_with(UTF8_BOM));
    assert_eq!(csv, format!("{UTF8_BOM}{}\n", CSV_HEADERS.join(",")));
}

#[test]
fn cells_survive_quotes_commas_and_newlines() {
    let results = [result("Nguyễn Văn An", "An", "x = 1, y = \"2\"\ndòng hai", 7.5)];
    let csv = to_csv(&results).expect("render csv");
    let rows = parse(&csv);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], CSV_HEADERS);

    let row = &rows[1];
    assert_eq!(row[0], "1");
    assert_eq!(row[1], "Nguyễn Văn An");
    assert_eq!(row[2], "x = 1, y = \"2\"\ndòng hai");
    assert_eq!(row[4], "Nhì");
    assert_eq!(row[5], "7.5");
    assert_eq!(row[6].lines().count(), 5);
    assert!(row[6].starts_with("Con làm đúng \"bước 1\"."));
}

#[test]
fn every_data_cell_is_quoted() {
    let results = [result("Lê Bình", "Bình", "42", 10.0)];
    let csv = to_csv(&results).expect("render csv");
    let data = csv.lines().nth(1).expect("data row");

    assert!(data.starts_with("\"1\",\"Lê Bình\",\"42\",\"20:15\",\"Nhì\",\"10\","));
}

#[test]
fn export_follows_the_active_view() {
    let results = [
        result("Lê Bình", "Bình", "1", 6.0),
        result("Trần An", "An", "2", 9.0),
    ];
    let view = SortPolicy::new(SortKey::Score, SortOrder::Descending).apply(&results);
    let rows = parse(&to_csv(view).expect("render csv"));

    assert_eq!(rows[1][0], "1");
    assert_eq!(rows[1][1], "Trần An");
    assert_eq!(rows[2][0], "2");
    assert_eq!(rows[2][1], "Lê Bình");
}

#[test]
fn write_csv_creates_the_file() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("class.csv");
    let results = [result("Lê Bình", "Bình", "42", 8.0)];

    write_csv(&results, &path).expect("write csv");
    let text = fs::read_to_string(&path).expect("read csv back");
    assert_eq!(parse(&text).len(), 2);
}
