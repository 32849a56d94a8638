//! Interactive translator.
//!
//! Plain input edits the source text; slash commands drive everything else.
//! A background task prints state changes as the orchestrator publishes them.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use babel_application::{TranslateEvent, TranslateHandle, TranslateState};
use babel_core::Language;
use babel_core::translate::TranslateError;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::watch;

use super::{history, languages};
use crate::app::{App, parse_language};

const COMMANDS: &[&str] = &[
    "/translate",
    "/swap",
    "/from",
    "/to",
    "/edit",
    "/close",
    "/history",
    "/pick",
    "/languages",
    "/help",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
    language_codes: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
            language_codes: Language::all()
                .iter()
                .map(|language| language.code().to_string())
                .collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        // Language codes after /from and /to.
        if let Some((command, partial)) = line.split_once(' ') {
            if command == "/from" || command == "/to" {
                let candidates = self
                    .language_codes
                    .iter()
                    .filter(|code| code.starts_with(partial.trim_start()))
                    .map(|code| Pair {
                        display: code.clone(),
                        replacement: code.clone(),
                    })
                    .collect();
                return Ok((pos - partial.trim_start().len(), candidates));
            }
            return Ok((0, vec![]));
        }

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// A parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Text(String),
    Translate,
    Swap,
    From(String),
    To(String),
    Edit,
    Close,
    History,
    Pick(usize),
    Languages,
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == "quit" || trimmed == "exit" {
            return Some(ReplCommand::Quit);
        }
        if !trimmed.starts_with('/') {
            return Some(ReplCommand::Text(trimmed.to_string()));
        }

        let (command, argument) = match trimmed.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (trimmed, ""),
        };

        let parsed = match (command, argument) {
            ("/translate", "") => ReplCommand::Translate,
            ("/swap", "") => ReplCommand::Swap,
            ("/edit", "") => ReplCommand::Edit,
            ("/close", "") => ReplCommand::Close,
            ("/history", "") => ReplCommand::History,
            ("/languages", "") => ReplCommand::Languages,
            ("/help", "") => ReplCommand::Help,
            ("/from", code) if !code.is_empty() => ReplCommand::From(code.to_string()),
            ("/to", code) if !code.is_empty() => ReplCommand::To(code.to_string()),
            ("/pick", number) => match number.parse::<usize>() {
                Ok(number) if number > 0 => ReplCommand::Pick(number),
                _ => ReplCommand::Invalid("Usage: /pick <number from /history>".to_string()),
            },
            ("/from", _) | ("/to", _) => {
                ReplCommand::Invalid(format!("Usage: {} <language code>", command))
            }
            _ => ReplCommand::Invalid(format!("Unknown command: {}", trimmed)),
        };
        Some(parsed)
    }
}

pub async fn run(app: &App) -> Result<()> {
    let (from, to) = app.settings.default_languages()?;
    let handle = app.translator(from, to);
    let renderer = tokio::spawn(render_changes(handle.subscribe(), handle.clone()));

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Babel ===".bright_magenta().bold());
    println!(
        "{}",
        "Type text to translate, '/translate' to send it, '/help' for commands, or 'quit' to exit."
            .bright_black()
    );
    print_languages(&handle.state());
    println!();

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let Some(command) = ReplCommand::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                if command == ReplCommand::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if let Err(e) = dispatch(&handle, command) {
                    eprintln!("{}", format!("Error: {}", e).red());
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    // Dropping the last handle stops the orchestrator and the renderer.
    drop(handle);
    renderer.abort();
    let _ = renderer.await;

    Ok(())
}

fn dispatch(handle: &TranslateHandle, command: ReplCommand) -> Result<()> {
    let state = handle.state();
    match command {
        ReplCommand::Text(text) => {
            if !state.is_editable() {
                println!(
                    "{}",
                    "A translation is shown. Use /edit to change it or /close to start over."
                        .yellow()
                );
                return Ok(());
            }
            handle.send(TranslateEvent::ChangeText(text))?;
        }
        ReplCommand::Translate => {
            if state.from_text.trim().is_empty() {
                println!("{}", "Type something to translate first.".yellow());
                return Ok(());
            }
            handle.send(TranslateEvent::Translate)?;
        }
        ReplCommand::Swap => handle.send(TranslateEvent::SwapLanguages)?,
        ReplCommand::From(code) => {
            let language = parse_language(&code)?;
            if language == state.to_language {
                println!("{}", format!("{} is already the target language.", language).yellow());
            }
            handle.send(TranslateEvent::ChooseFromLanguage(language))?;
        }
        ReplCommand::To(code) => {
            let language = parse_language(&code)?;
            if language == state.from_language {
                println!("{}", format!("{} is already the source language.", language).yellow());
            }
            handle.send(TranslateEvent::ChooseToLanguage(language))?;
        }
        ReplCommand::Edit => handle.send(TranslateEvent::EditTranslation)?,
        ReplCommand::Close => handle.send(TranslateEvent::CloseTranslation)?,
        ReplCommand::History => history::print_numbered(&state.history),
        ReplCommand::Pick(number) => match state.history.get(number - 1) {
            Some(item) => handle.send(TranslateEvent::SelectHistoryItem(item.clone()))?,
            None => println!(
                "{}",
                format!("No history entry #{} (have {}).", number, state.history.len()).yellow()
            ),
        },
        ReplCommand::Languages => languages::print_table(),
        ReplCommand::Help => print_help(),
        ReplCommand::Invalid(message) => println!("{}", message.yellow()),
        ReplCommand::Quit => {}
    }
    Ok(())
}

/// Prints what changed between consecutive published states.
async fn render_changes(mut states: watch::Receiver<TranslateState>, handle: TranslateHandle) {
    let mut previous = states.borrow_and_update().clone();

    while states.changed().await.is_ok() {
        let current = states.borrow_and_update().clone();

        if current.from_language != previous.from_language
            || current.to_language != previous.to_language
        {
            print_languages(&current);
        }
        if current.is_translating() && !previous.is_translating() {
            println!("{}", "Translating...".bright_black());
        }
        if current.is_showing_result()
            && (!previous.is_showing_result()
                || current.to_text != previous.to_text
                || current.from_text != previous.from_text)
        {
            println!("{}", current.from_text);
            println!("{}", current.to_text.bright_blue());
        }
        if previous.is_showing_result() && current.phase != previous.phase && !current.is_translating() {
            if current.from_text.is_empty() {
                println!("{}", "Cleared.".bright_black());
            } else if current.is_editable() {
                println!("{}", format!("Editing: {}", current.from_text).bright_black());
            }
        }
        if current.history.len() > previous.history.len() {
            println!(
                "{}",
                format!("Saved to history ({} entries).", current.history.len()).bright_black()
            );
        }
        if let Some(error) = fresh_error(&previous, &current) {
            eprintln!("{}", error.user_message().red());
            // Shown once; acknowledge so the next failure is reported too.
            if handle.send(TranslateEvent::OnErrorSeen).is_err() {
                break;
            }
        }

        previous = current;
    }
}

/// The error to report for this state change, if it was not already shown.
fn fresh_error(previous: &TranslateState, current: &TranslateState) -> Option<TranslateError> {
    current.error.filter(|error| previous.error != Some(*error))
}

fn print_languages(state: &TranslateState) {
    println!(
        "{}",
        format!("{} → {}", state.from_language, state.to_language).bright_cyan()
    );
}

fn print_help() {
    let lines = [
        ("<text>", "set the text to translate"),
        ("/translate", "translate the current text"),
        ("/swap", "swap source and target languages"),
        ("/from <code>", "set the source language"),
        ("/to <code>", "set the target language"),
        ("/edit", "edit the text of the shown translation"),
        ("/close", "clear the current translation"),
        ("/history", "list past translations"),
        ("/pick <n>", "show entry n from /history"),
        ("/languages", "list supported languages"),
        ("quit", "exit"),
    ];
    for (command, description) in lines {
        println!("  {:<14} {}", command.bright_cyan(), description.bright_black());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use babel_core::history::UiHistoryItem;

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(
            ReplCommand::parse("  good morning "),
            Some(ReplCommand::Text("good morning".to_string()))
        );
        assert_eq!(ReplCommand::parse("   "), None);
        assert_eq!(ReplCommand::parse("exit"), Some(ReplCommand::Quit));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("/translate"), Some(ReplCommand::Translate));
        assert_eq!(ReplCommand::parse("/swap"), Some(ReplCommand::Swap));
        assert_eq!(
            ReplCommand::parse("/from ja"),
            Some(ReplCommand::From("ja".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("/to   de"),
            Some(ReplCommand::To("de".to_string()))
        );
        assert_eq!(ReplCommand::parse("/pick 3"), Some(ReplCommand::Pick(3)));
    }

    #[test]
    fn test_parse_invalid_commands() {
        assert!(matches!(
            ReplCommand::parse("/pick 0"),
            Some(ReplCommand::Invalid(_))
        ));
        assert!(matches!(
            ReplCommand::parse("/from"),
            Some(ReplCommand::Invalid(_))
        ));
        assert!(matches!(
            ReplCommand::parse("/frobnicate"),
            Some(ReplCommand::Invalid(_))
        ));
        assert!(matches!(
            ReplCommand::parse("/swap now"),
            Some(ReplCommand::Invalid(_))
        ));
    }

    #[test]
    fn test_error_reported_once_until_acknowledged() {
        let mut failed = TranslateState::new(Language::ENGLISH, Language::FRENCH);
        failed.error = Some(TranslateError::ServerError);
        let mut clean = failed.clone();
        clean.error = None;

        assert_eq!(fresh_error(&clean, &failed), Some(TranslateError::ServerError));

        // A history push before the acknowledgement still carries the error.
        let mut pushed = failed.clone();
        pushed.history = vec![UiHistoryItem {
            id: 1,
            from_language: Language::ENGLISH,
            from_text: "hi".to_string(),
            to_language: Language::FRENCH,
            to_text: "salut".to_string(),
        }];
        assert_eq!(fresh_error(&failed, &pushed), None);

        let mut other = failed.clone();
        other.error = Some(TranslateError::ClientError);
        assert_eq!(fresh_error(&failed, &other), Some(TranslateError::ClientError));
        assert_eq!(fresh_error(&failed, &clean), None);
    }

    #[test]
    fn test_completes_language_codes() {
        let helper = CliHelper::new();
        let history = rustyline::history::DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, candidates) = helper.complete("/to j", 5, &ctx).unwrap();
        assert_eq!(start, 4);
        assert!(candidates.iter().any(|pair| pair.replacement == "ja"));

        let (_, candidates) = helper.complete("/tr", 3, &ctx).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].replacement, "/translate");
    }
}
