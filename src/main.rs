#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # tally
//! ## Introduction
//!
//! Grades a class with an LLM and prints the report.
//!
//! ## Configuration
//!
//! Put `TALLY_API_KEY` (or `GEMINI_API_KEY`) in the environment or a `.env`
//! file. `TALLY_API_BASE` and `TALLY_MODEL` point it at any
//! OpenAI-compatible endpoint.

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use bpaf::*;
use dotenvy::dotenv;
use tally::{
    OpenAiEngine,
    config,
    report::{SortKey, decode_report, render_report, write_csv},
    request::decode_data_url,
    session::{self, SessionSettings},
    sheet::fetch_sheet,
    state::{Action, AppState, reduce},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// How the report is shown and exported.
#[derive(Debug, Clone)]
struct ViewArgs {
    /// Roster ordering.
    sort: SortKey,
    /// Largest first.
    desc: bool,
    /// CSV export destination.
    csv:  Option<PathBuf>,
}

/// Inputs for a grading run.
#[derive(Debug, Clone)]
struct GradeArgs {
    /// Path or data URL of the test photo.
    image:       String,
    /// Rubric file.
    guide:       Option<PathBuf>,
    /// Submission rows file.
    sheet:       Option<PathBuf>,
    /// Published spreadsheet link.
    sheet_url:   Option<String>,
    /// Camera-visible roster file.
    cam_visible: Option<PathBuf>,
    /// Camera-hidden roster file.
    cam_hidden:  Option<PathBuf>,
    /// Praise roster file.
    praise:      Option<PathBuf>,
    /// Where to save the validated report as JSON.
    json:        Option<PathBuf>,
    /// Display options.
    view:        ViewArgs,
}

/// Inputs for re-rendering a saved response.
#[derive(Debug, Clone)]
struct RenderArgs {
    /// Praise roster file.
    praise:      Option<PathBuf>,
    /// Camera-visible roster file.
    cam_visible: Option<PathBuf>,
    /// Camera-hidden roster file.
    cam_hidden:  Option<PathBuf>,
    /// Display options.
    view:        ViewArgs,
    /// Saved engine response.
    report:      PathBuf,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a class
    Grade(GradeArgs),
    /// Render a saved engine response
    Render(RenderArgs),
    /// Print the CSV export of a published sheet
    FetchSheet(String),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses a roster or text file path
    fn file(name: &'static str, help: &'static str) -> impl Parser<Option<PathBuf>> {
        long(name).help(help).argument::<PathBuf>("PATH").optional()
    }

    /// parses sorting and export options
    fn view_args() -> impl Parser<ViewArgs> {
        let sort = long("sort")
            .help("Order by name, score or time")
            .argument::<String>("KEY")
            .parse(|s| s.parse::<SortKey>())
            .fallback(SortKey::Name);
        let desc = long("desc").help("Sort in descending order").switch();
        let csv = long("csv")
            .help("Export the results as CSV to this path")
            .argument::<PathBuf>("PATH")
            .optional();
        construct!(ViewArgs { sort, desc, csv })
    }

    let image = long("image")
        .help("Photo of the test, as a file path or a data: URL")
        .argument::<String>("PATH");
    let guide = file("guide", "Marking guide text file");
    let sheet = file("sheet", "Submission rows copied from the sheet (TSV or CSV)");
    let sheet_url = long("sheet-url")
        .help("Published Google Sheets link to download rows from")
        .argument::<String>("URL")
        .optional();
    let cam_visible = file("cam-visible", "Students whose camera showed their work");
    let cam_hidden = file("cam-hidden", "Students whose camera was off");
    let praise = file("praise", "Students earning the participation bonus");
    let json = file("json", "Save the validated report as JSON");
    let view = view_args();

    let grade = construct!(GradeArgs {
        image,
        guide,
        sheet,
        sheet_url,
        cam_visible,
        cam_hidden,
        praise,
        json,
        view
    })
    .map(Cmd::Grade)
    .to_options()
    .command("grade")
    .help("Grade a class with the configured engine");

    let report = positional::<PathBuf>("REPORT").help("Saved JSON response from the engine");
    let praise = file("praise", "Students earning the participation bonus");
    let cam_visible = file("cam-visible", "Students whose camera showed their work");
    let cam_hidden = file("cam-hidden", "Students whose camera was off");
    let view = view_args();
    let render = construct!(RenderArgs {
        praise,
        cam_visible,
        cam_hidden,
        view,
        report
    })
    .map(Cmd::Render)
    .to_options()
        .command("render")
        .help("Validate and display a saved engine response");

    let url = positional::<String>("URL").help("Published spreadsheet link");
    let fetch = construct!(Cmd::FetchSheet(url))
        .to_options()
        .command("fetch-sheet")
        .help("Print the CSV export of a published spreadsheet");

    let cmd = construct!([grade, render, fetch]);

    cmd.to_options().descr("LLM grading assistant").run()
}

/// Reads an optional text file, empty when not given.
fn read_text(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
        }
        None => Ok(String::new()),
    }
}

/// Loads the test photo from a path or a data URL.
fn read_image(source: &str) -> Result<Vec<u8>> {
    if source.starts_with("data:") {
        decode_data_url(source)
    } else {
        fs::read(source).with_context(|| format!("Could not read image {source}"))
    }
}

/// Applies the view options to a state.
fn with_view(state: AppState, view: &ViewArgs) -> AppState {
    let state = reduce(&state, Action::SortBy(view.sort));
    if view.desc {
        reduce(&state, Action::ToggleSortOrder)
    } else {
        state
    }
}

/// Prints the report held in `state` and writes the requested exports.
fn show(state: &AppState, view: &ViewArgs) -> Result<()> {
    let Some(report) = state.report() else {
        bail!("No report to show");
    };
    println!("{}", render_report(report, state.sort(), state.input()));

    if let Some(path) = &view.csv {
        write_csv(state.view(), path)?;
    }
    Ok(())
}

/// Runs the `grade` command.
async fn grade(args: GradeArgs) -> Result<()> {
    let cfg = config::ensure_initialized()?;
    let engine = OpenAiEngine::from_config(&cfg)?;

    let mut state = AppState::default();
    for action in [
        Action::SetTestImage(Some(read_image(&args.image)?)),
        Action::SetMarkingGuide(read_text(args.guide.as_ref())?),
        Action::SetSheetData(read_text(args.sheet.as_ref())?),
        Action::SetCamVisible(read_text(args.cam_visible.as_ref())?),
        Action::SetCamHidden(read_text(args.cam_hidden.as_ref())?),
        Action::SetPraise(read_text(args.praise.as_ref())?),
    ] {
        state = reduce(&state, action);
    }

    if let Some(url) = args.sheet_url {
        state = reduce(&state, Action::SetSheetUrl(url));
        state = session::refresh_sheet(&cfg.http_client(), &state).await;
        if let Some(err) = state.last_error() {
            bail!("{err}");
        }
    }
    state = with_view(state, &args.view);

    let settings = SessionSettings::from_config(&cfg);
    let (state, outcome) = session::run_grading(&engine, &state, &settings, |s| {
        if !s.status().is_empty() {
            tracing::info!("{}", s.status());
        }
    })
    .await;

    if let Err(err) = outcome {
        eprintln!("{}", err.user_message());
        return Err(err.into());
    }

    if let (Some(path), Some(report)) = (&args.json, state.report()) {
        let json = serde_json::to_string_pretty(report.as_ref())?;
        fs::write(path, json).with_context(|| format!("Could not write {}", path.display()))?;
    }
    show(&state, &args.view)
}

/// Runs the `render` command.
fn render(args: RenderArgs) -> Result<()> {
    let cfg = config::ensure_initialized()?;
    let payload = fs::read_to_string(&args.report)
        .with_context(|| format!("Could not read {}", args.report.display()))?;
    let decoded = decode_report(&payload, cfg.decode_options())?;

    let mut state = AppState::default();
    for action in [
        Action::SetPraise(read_text(args.praise.as_ref())?),
        Action::SetCamVisible(read_text(args.cam_visible.as_ref())?),
        Action::SetCamHidden(read_text(args.cam_hidden.as_ref())?),
        Action::GradingStarted,
        Action::GradingSucceeded(Arc::new(decoded)),
    ] {
        state = reduce(&state, action);
    }
    show(&with_view(state, &args.view), &args.view)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let level = std::env::var("TALLY_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();

    match cmd {
        Cmd::Grade(args) => grade(args).await?,
        Cmd::Render(args) => render(args)?,
        Cmd::FetchSheet(url) => {
            let cfg = config::ensure_initialized()?;
            let text = fetch_sheet(&cfg.http_client(), &url).await?;
            println!("{text}");
        }
    };

    Ok(())
}
