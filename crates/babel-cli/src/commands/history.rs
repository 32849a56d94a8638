use anyhow::{Context, Result};
use babel_core::history::{HistoryItem, HistoryRepository, UiHistoryItem};
use colored::Colorize;

use crate::app::App;

pub async fn run(app: &App, limit: usize) -> Result<()> {
    let items = app
        .repository
        .list()
        .await
        .context("Failed to read translation history")?;

    if items.is_empty() {
        println!("{}", "No translations yet.".bright_black());
        return Ok(());
    }

    for item in items.iter().take(limit) {
        print_item(item);
    }
    if items.len() > limit {
        println!(
            "{}",
            format!("... {} older entries", items.len() - limit).bright_black()
        );
    }
    Ok(())
}

fn print_item(item: &HistoryItem) {
    let stamp = item
        .created_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");
    println!(
        "{} {} {}",
        format!("#{}", item.id.unwrap_or_default()).bright_black(),
        stamp.to_string().bright_black(),
        format!("[{} → {}]", item.from_language_code, item.to_language_code).bright_cyan()
    );
    println!("    {}", item.from_text);
    println!("    {}", item.to_text.bright_blue());
}

/// Numbered listing used by the REPL's `/history`; numbers feed `/pick`.
pub fn print_numbered(items: &[UiHistoryItem]) {
    if items.is_empty() {
        println!("{}", "No translations yet.".bright_black());
        return;
    }
    for (index, item) in items.iter().enumerate() {
        println!(
            "{:>3}. {} {} {} {}",
            index + 1,
            format!("[{} → {}]", item.from_language.code(), item.to_language.code()).bright_cyan(),
            item.from_text,
            "→".bright_black(),
            item.to_text.bright_blue()
        );
    }
}
