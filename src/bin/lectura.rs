//! CLI binary for lectura.
//!
//! A thin interactive shell over the library crate: opens a PDF, prints
//! the initial summary, then reads commands and chat messages from stdin.
//! Streamed chat fragments are printed as they arrive via the session
//! observer.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lectura::{
    render, Screen, Session, SessionConfig, SessionObserver, View, CHAT_ERROR_MESSAGE,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Streaming printer ────────────────────────────────────────────────────────

/// Prints each chat fragment's new suffix as it lands in the store.
///
/// The store replaces the trailing turn with the full accumulated text per
/// fragment, so the printable delta is everything past what was already
/// written. A shrinking text (the error overwrite) prints nothing; the
/// shell reports that case itself.
struct StreamPrinter {
    printed: Mutex<usize>,
}

impl SessionObserver for StreamPrinter {
    fn state_changed(&self, state: &lectura::AppState) {
        let mut printed = self.printed.lock().unwrap();
        if !state.is_streaming {
            *printed = 0;
            return;
        }
        let Some(last) = state.conversation.last() else {
            return;
        };
        if last.role != lectura::Role::Model || last.text.len() < *printed {
            return;
        }
        print!("{}", &last.text[*printed..]);
        io::stdout().flush().ok();
        *printed = last.text.len();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Open a PDF, print its summary, then chat
  lectura novel.pdf

  # Focus the initial summary on a question
  lectura novel.pdf --question "Who betrays the protagonist?"

  # Translate into another language
  lectura novel.pdf --target-language French

INTERACTIVE COMMANDS:
  <message>            chat about the document (streams the reply)
  /summary [question]  regenerate the summary, optionally refocused
  /refine <request>    refine the current summary
  /translate           translate the document
  /screen              print the active screen as JSON
  /view <tab>          switch tab: summary, chat, translate
  /reset               drop the document and all results
  /quit                exit

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY           Gemini API key (required for generation calls)
  LECTURA_MODEL            Override model ID (default: gemini-2.5-flash)
  LECTURA_TARGET_LANGUAGE  Translation target (default: Spanish)

SETUP:
  1. Set API key:  export GEMINI_API_KEY=...
  2. Open a PDF:   lectura novel.pdf
"#;

/// Summarise, chat with, and translate PDF documents using Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "lectura",
    version,
    about = "Summarise, chat with, and translate PDF documents using Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF to open.
    input: PathBuf,

    /// Focus question for the initial summary.
    #[arg(short, long)]
    question: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "LECTURA_MODEL", default_value = lectura::DEFAULT_MODEL)]
    model: String,

    /// API key. Read from GEMINI_API_KEY when not given.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Language the /translate command targets.
    #[arg(long, env = "LECTURA_TARGET_LANGUAGE", default_value = "Spanish")]
    target_language: String,

    /// Skip the automatic summary after opening.
    #[arg(long)]
    no_summary: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = SessionConfig::builder()
        .model(cli.model.clone())
        .target_language(cli.target_language.clone())
        .observer(Arc::new(StreamPrinter {
            printed: Mutex::new(0),
        }) as Arc<dyn SessionObserver>);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    } else {
        eprintln!(
            "{}",
            red("GEMINI_API_KEY is not set — generation commands will fail.")
        );
    }
    let config = builder.build().context("Invalid configuration")?;
    let mut session = Session::new(config);

    // ── Open the document ────────────────────────────────────────────────
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let file_name = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.input.display().to_string());
    let declared_mime = match cli.input.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    };

    let bar = spinner("Extracting text…");
    let uploaded = session.handle_upload(bytes, &file_name, declared_mime).await;
    bar.finish_and_clear();
    uploaded.with_context(|| format!("Could not open {}", cli.input.display()))?;

    let doc_chars = session
        .state()
        .document
        .as_ref()
        .map(|d| d.text.chars().count())
        .unwrap_or(0);
    eprintln!(
        "{} {}  {}",
        cyan("◆"),
        bold(&file_name),
        dim(&format!("{doc_chars} chars extracted"))
    );

    // ── Initial summary ──────────────────────────────────────────────────
    if !cli.no_summary {
        if let Some(q) = cli.question.as_deref() {
            session.set_summary_question(q);
        }
        let bar = spinner("Summarising…");
        session.generate_summary().await;
        bar.finish_and_clear();
        println!("\n{}\n{}\n", bold("Summary"), session.state().summary_raw);
    }

    // ── Interactive shell ────────────────────────────────────────────────
    eprintln!("{}", dim("Type a message to chat, or /help for commands."));
    let stdin = io::stdin();
    loop {
        eprint!("{} ", cyan("lectura>"));
        io::stderr().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest)) {
            ("/quit", _) | ("/exit", _) => break,
            ("/help", _) => eprintln!("{AFTER_HELP}"),
            ("/summary", rest) => {
                session.set_summary_question(rest);
                let bar = spinner("Summarising…");
                session.generate_summary().await;
                bar.finish_and_clear();
                println!("{}", session.state().summary_raw);
            }
            ("/refine", rest) if !rest.trim().is_empty() => {
                session.set_refine_request(rest);
                let bar = spinner("Refining…");
                session.refine_summary().await;
                bar.finish_and_clear();
                println!("{}", session.state().summary_raw);
            }
            ("/refine", _) => eprintln!("{}", red("Usage: /refine <request>")),
            ("/translate", _) => {
                session.select_view(View::Translate);
                let bar = spinner("Translating…");
                session.translate_document().await;
                bar.finish_and_clear();
                println!("{}", session.state().translation_result);
            }
            ("/screen", _) => {
                let screen = render(session.state());
                println!("{}", serde_json::to_string_pretty(&screen)?);
            }
            ("/view", rest) => {
                match rest.trim() {
                    "summary" => session.select_view(View::Summary),
                    "chat" => session.select_view(View::Chat),
                    "translate" => session.select_view(View::Translate),
                    other => {
                        eprintln!("{}", red(&format!("Unknown tab '{other}'")));
                        continue;
                    }
                }
                if let Screen::Summary(s) = render(session.state()) {
                    if !s.summary_html.is_empty() {
                        println!("{}", session.state().summary_raw);
                    }
                }
            }
            ("/reset", _) => {
                session.reset();
                eprintln!("{}", dim("Session cleared. /quit to exit."));
            }
            (cmd, _) if cmd.starts_with('/') => {
                eprintln!("{}", red(&format!("Unknown command {cmd} — try /help")));
            }
            _ => {
                // Plain input is a chat message; the observer streams the
                // reply to stdout as fragments arrive.
                session.select_view(View::Chat);
                print!("{} ", dim("model>"));
                io::stdout().flush().ok();
                session.send_chat_message(line).await;
                let failed = session
                    .state()
                    .conversation
                    .last()
                    .is_some_and(|t| t.text == CHAT_ERROR_MESSAGE);
                if failed {
                    println!("{}", red(CHAT_ERROR_MESSAGE));
                } else {
                    println!();
                }
            }
        }
    }

    Ok(())
}
