#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::model::GradingResult;

/// UTF-8 byte-order mark so spreadsheet programs pick the right encoding.
pub const UTF8_BOM: &str = "\u{FEFF}";

/// Column headings of the exported sheet.
pub const CSV_HEADERS: [&str; 7] =
    ["STT", "Họ tên", "Bài làm", "Thời gian", "Xếp hạng", "Điểm", "Nhận xét"];

/// Renders results, in the order given, as a spreadsheet-friendly CSV
/// document.
///
/// The header line is written bare; every data cell is quoted with inner
/// quotes doubled.
pub fn to_csv<'a, I>(results: I) -> Result<String>
where
    I: IntoIterator<Item = &'a GradingResult>,
{
    let mut out = Vec::new();
    writeln!(out, "{UTF8_BOM}{}", CSV_HEADERS.join(","))?;

    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);

        for (i, result) in results.into_iter().enumerate() {
            writer
                .write_record([
                    (i + 1).to_string(),
                    result.student_name().to_string(),
                    result.student_answer().to_string(),
                    result.submission_time().to_string(),
                    result.rank().label().to_string(),
                    result.score().to_string(),
                    result.feedback_text(),
                ])
                .with_context(|| format!("Could not write CSV row for {}", result.student_name()))?;
        }
        writer.flush().context("Could not flush CSV writer")?;
    }

    String::from_utf8(out).context("CSV output was not valid UTF-8")
}

/// Writes [`to_csv`] output to `path`.
pub fn write_csv<'a, I>(results: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a GradingResult>,
{
    let csv = to_csv(results)?;
    fs::write(path, csv).with_context(|| format!("Could not write {}", path.display()))?;
    tracing::info!("Exported results to {}", path.display());
    Ok(())
}
