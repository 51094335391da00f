mod terminal_surface;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use mapchat_application::{MapChatSession, Submission};
use mapchat_core::markup::{self, MarkupSpan};
use mapchat_core::{ChatEntry, EntryId};
use mapchat_infrastructure::{ConfigService, HttpAssistantBackend};
use terminal_surface::TerminalSurface;

const COMMANDS: [&str; 3] = ["/map", "/history", "/quit"];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
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

/// Renders chat markup with terminal emphasis instead of HTML.
fn render_terminal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    write_terminal(&markup::parse(text), false, &mut out);
    out
}

fn write_terminal(spans: &[MarkupSpan], strong: bool, out: &mut String) {
    for span in spans {
        match span {
            MarkupSpan::Text(t) if strong => out.push_str(&t.bold().to_string()),
            MarkupSpan::Text(t) => out.push_str(t),
            MarkupSpan::Strong(inner) => write_terminal(inner, true, out),
            MarkupSpan::LineBreak => out.push('\n'),
        }
    }
}

fn print_entry(entry: &ChatEntry) {
    let time = entry.format_time().bright_black();
    if entry.is_user() {
        println!("{} {}", time, format!("> {}", entry.text).green());
    } else {
        println!("{}", time);
        for line in render_terminal(&entry.text).lines() {
            println!("{}", line.bright_blue());
        }
    }
}

/// Prints entries appended since `last_seen` and returns the new high-water mark.
fn print_new_entries(session: &MapChatSession, last_seen: EntryId) -> EntryId {
    let mut last = last_seen;
    for entry in session.transcript().since(last_seen) {
        print_entry(&entry);
        last = entry.id;
    }
    last
}

async fn print_map(session: &MapChatSession) {
    let map = session.map();
    println!(
        "{}",
        format!(
            "View ({:.4}, {:.4}) zoom {} [{}]",
            map.view.center.lat, map.view.center.lon, map.view.zoom, map.generation
        )
        .bright_yellow()
    );
    let mounted = session.mounted_markers().await;
    if mounted.markers.is_empty() {
        println!("{}", "  no markers".bright_black());
    }
    for marker in &mounted.markers {
        println!(
            "  {} ({:.4}, {:.4})",
            marker.location.name.cyan(),
            marker.location.lat,
            marker.location.lon
        );
    }
}

/// Entry point of the MapChat REPL.
///
/// Loads `~/.config/mapchat/config.toml`, connects to the configured assistant
/// endpoint, and prints transcript entries and map changes as they happen.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Session Initialization =====
    let config = ConfigService::new().get_config();
    let backend = Arc::new(HttpAssistantBackend::from_config(&config.backend)?);
    tracing::info!("Using assistant endpoint {}", backend.endpoint());
    let session = MapChatSession::new(&config, backend, Arc::new(TerminalSurface::new()));

    println!("{}", "=== MapChat ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask for places; '/map' shows the map, '/history' the transcript, '/quit' exits."
            .bright_black()
    );
    println!();

    if let Err(e) = session.present().await {
        eprintln!("{}", format!("Map unavailable: {}", e).red());
    }
    let mut last_seen = print_new_entries(&session, EntryId(0));

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "/quit" | "quit" | "exit" => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    "/map" => {
                        print_map(&session).await;
                        continue;
                    }
                    "/history" => {
                        for entry in session.transcript().list() {
                            print_entry(&entry);
                        }
                        continue;
                    }
                    _ => {}
                }

                match session.submit(&line) {
                    Submission::Rejected => continue,
                    Submission::Busy => {
                        println!("{}", "Still waiting for the previous reply.".yellow());
                        continue;
                    }
                    submission @ Submission::Dispatched { .. } => {
                        let _ = rl.add_history_entry(trimmed);
                        last_seen = print_new_entries(&session, last_seen);
                        println!("{}", "...".bright_black());
                        if submission.outcome().await.is_none() {
                            eprintln!("{}", "Exchange was interrupted.".red());
                        }
                        last_seen = print_new_entries(&session, last_seen);
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
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

    Ok(())
}
