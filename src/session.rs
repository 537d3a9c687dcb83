#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! One grading run, from button press to displayed report.

use std::{sync::Arc, time::Duration};

use reqwest::Client;
use tokio::sync::mpsc;

use crate::{
    config::ConfigHandle,
    engine::{GradingEngine, submit_with_timeout},
    error::EngineError,
    request::check_preconditions,
    sheet::fetch_sheet,
    state::{Action, AppState, reduce},
    status::StatusTicker,
};

/// Timing and wording of a grading run.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Deadline for the engine call.
    pub timeout:         Duration,
    /// Period of the status ticker.
    pub status_interval: Duration,
    /// Lines cycled by the status ticker.
    pub status_messages: Vec<String>,
}

impl SessionSettings {
    /// Settings taken from the global configuration.
    pub fn from_config(cfg: &ConfigHandle) -> Self {
        Self {
            timeout:         cfg.request_timeout(),
            status_interval: cfg.status_interval(),
            status_messages: cfg.prompts().status_messages().to_vec(),
        }
    }
}

/// Grades the class held in `state`.
///
/// Returns the final state along with the outcome. On any failure the
/// previously displayed report is left as it was. `on_change` sees every
/// intermediate state, including status ticks.
pub async fn run_grading<E, F>(
    engine: &E,
    state: &AppState,
    settings: &SessionSettings,
    mut on_change: F,
) -> (AppState, Result<(), EngineError>)
where
    E: GradingEngine,
    F: FnMut(&AppState),
{
    if state.is_processing() {
        return (
            state.clone(),
            Err(EngineError::PreconditionFailed(
                "a grading request is already in progress".into(),
            )),
        );
    }
    if let Err(err) = check_preconditions(state.input()) {
        let next = reduce(state, Action::GradingFailed(err.user_message()));
        on_change(&next);
        return (next, Err(err));
    }

    let mut current = reduce(state, Action::GradingStarted);
    on_change(&current);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let ticker = StatusTicker::spawn(
        settings.status_messages.clone(),
        settings.status_interval,
        move |line| {
            let _ = tx.send(line.to_string());
        },
    );

    let input = current.input().clone();
    let call = submit_with_timeout(engine, &input, settings.timeout);
    tokio::pin!(call);

    let outcome = loop {
        tokio::select! {
            outcome = &mut call => break outcome,
            Some(line) = rx.recv() => {
                current = reduce(&current, Action::StatusTick(line));
                on_change(&current);
            }
        }
    };
    ticker.stop().await;

    let (next, result) = match outcome {
        Ok(report) => {
            tracing::info!(
                "Graded {} student(s), {} warning(s)",
                report.results().len(),
                report.validation_warnings().len()
            );
            (reduce(&current, Action::GradingSucceeded(Arc::new(report))), Ok(()))
        }
        Err(err) => {
            tracing::error!("{err}");
            (reduce(&current, Action::GradingFailed(err.user_message())), Err(err))
        }
    };
    on_change(&next);
    (next, result)
}

/// Downloads the sheet at the state's URL into the sheet data field.
pub async fn refresh_sheet(client: &Client, state: &AppState) -> AppState {
    if state.sheet_url().trim().is_empty() || state.is_fetching() {
        return state.clone();
    }

    let fetching = reduce(state, Action::SheetFetchStarted);
    match fetch_sheet(client, fetching.sheet_url()).await {
        Ok(text) => reduce(&fetching, Action::SheetFetched(text)),
        Err(err) => {
            tracing::warn!("{err:#}");
            reduce(
                &fetching,
                Action::SheetFetchFailed(
                    "Không thể tải dữ liệu tự động. Hãy dán thủ công nội dung từ Sheet.".into(),
                ),
            )
        }
    }
}
