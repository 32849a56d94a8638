use std::time::Duration;

use anyhow::{Result, bail};
use babel_application::{TranslateEvent, TranslateState};
use babel_core::history::HistoryRepository;
use colored::Colorize;

use crate::app::{App, parse_language};

/// How long to wait for the history write after a successful translation.
const HISTORY_WAIT: Duration = Duration::from_secs(5);

pub async fn run(app: &App, from: Option<String>, to: Option<String>, text: String) -> Result<()> {
    let (default_from, default_to) = app.settings.default_languages()?;
    let from = from.as_deref().map(parse_language).transpose()?.unwrap_or(default_from);
    let to = to.as_deref().map(parse_language).transpose()?.unwrap_or(default_to);
    if from == to {
        bail!("Source and target language are both {}", from);
    }
    if text.trim().is_empty() {
        bail!("Nothing to translate");
    }

    // Ids only grow, so the new record is the first one above the current maximum.
    let last_id = app
        .repository
        .list()
        .await?
        .iter()
        .filter_map(|item| item.id)
        .max()
        .unwrap_or(0);
    let handle = app.translator(from, to);

    handle.send(TranslateEvent::ChangeText(text))?;
    handle.send(TranslateEvent::Translate)?;

    let state = handle
        .wait_for(|s| !s.is_translating() && (s.is_showing_result() || s.error.is_some()))
        .await?;

    if let Some(error) = state.error {
        bail!("{} ({:?})", error.user_message(), error);
    }

    println!("{}", state.to_text.bright_blue());

    let recorded = tokio::time::timeout(
        HISTORY_WAIT,
        handle.wait_for(|s| recorded_after(s, last_id)),
    )
    .await;
    if recorded.is_err() {
        tracing::warn!("[translate] History write did not complete within {:?}", HISTORY_WAIT);
    }
    Ok(())
}

/// Whether the published history holds a record newer than `last_id`.
fn recorded_after(state: &TranslateState, last_id: i64) -> bool {
    state.history.iter().any(|item| item.id > last_id)
}
