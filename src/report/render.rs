#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use colored::Colorize;
use itertools::Itertools;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::{
    model::{GradingReport, GradingResult, Rank},
    praise::{camera_status, is_praised},
    sort::SortPolicy,
};
use crate::request::ClassInput;

/// One line of the roster overview table.
#[derive(Tabled)]
struct RosterRow {
    #[tabled(rename = "STT")]
    /// 1-based position in the current view.
    index:    usize,
    #[tabled(rename = "Họ tên")]
    /// Full display name.
    name:     String,
    #[tabled(rename = "Thời gian")]
    /// Submission time.
    time:     String,
    #[tabled(rename = "Điểm")]
    /// Score out of ten.
    score:    String,
    #[tabled(rename = "Xếp hạng")]
    /// Distinction label.
    rank:     String,
    #[tabled(rename = "Khen")]
    /// Participation bonus marker.
    praised:  String,
}

/// Colours a rank label the way the report cards do.
fn paint_rank(rank: &Rank) -> String {
    match rank {
        Rank::First => rank.label().yellow().bold().to_string(),
        Rank::Second => rank.label().white().bold().to_string(),
        Rank::Third => rank.label().truecolor(205, 127, 50).bold().to_string(),
        Rank::HonorableMention => rank.label().green().to_string(),
        Rank::None(_) | Rank::Unranked => rank.label().red().to_string(),
    }
}

/// Average score of the rendered rows.
fn average(results: &[&GradingResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.score()).sum::<f64>() / results.len() as f64
}

/// Renders the whole report for a terminal: warnings, roster table, answer
/// key, then each student's feedback card.
///
/// The praise and camera rosters are read from `rosters`.
pub fn render_report(report: &GradingReport, policy: SortPolicy, rosters: &ClassInput) -> String {
    let view = policy.apply(report.results());
    let mut out = String::new();

    if !report.validation_warnings().is_empty() {
        out.push_str(&format!("{}\n", "CẢNH BÁO DỮ LIỆU".yellow().bold()));
        for (i, warning) in report.validation_warnings().iter().enumerate() {
            out.push_str(&format!("  {}. {warning}\n", i + 1));
        }
        out.push('\n');
    }

    let rows = view
        .iter()
        .enumerate()
        .map(|(i, r)| RosterRow {
            index:   i + 1,
            name:    r.student_name().to_string(),
            time:    r.submission_time().to_string(),
            score:   r.score().to_string(),
            rank:    r.rank().label().to_string(),
            praised: if is_praised(rosters.praise_list(), r) {
                "+1".to_string()
            } else {
                String::new()
            },
        })
        .collect::<Vec<_>>();

    out.push_str(
        &Table::new(&rows)
            .with(Panel::header(format!("Kết quả (sắp xếp: {} {:?})", policy.key(), policy.order())))
            .with(Panel::footer(format!(
                "Sĩ số: {} | Điểm TB: {:.2}",
                view.len(),
                average(&view)
            )))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(32).keep_words(true)))
            .with(
                Modify::new(Rows::first())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(Style::modern())
            .to_string(),
    );
    out.push_str("\n\n");

    out.push_str(&format!("{}\n{}\n\n", "ĐÁP ÁN".cyan().bold(), report.answer_key()));

    for (i, result) in view.iter().enumerate() {
        let camera = camera_status(rosters.cam_visible_list(), rosters.cam_hidden_list(), result);
        out.push_str(&format!(
            "{}. {} ({}/10) {} | Camera: {}\n",
            i + 1,
            result.student_name().bold(),
            result.score(),
            paint_rank(result.rank()),
            camera.label()
        ));
        let lines = result
            .feedback_lines()
            .map(|(category, line)| format!("   [{}] {line}", category.label()))
            .join("\n");
        out.push_str(&lines);
        out.push_str("\n\n");
    }

    out
}
