//! # lectura
//!
//! Summarise, chat with, and translate PDF documents using Gemini.
//!
//! ## Why this crate?
//!
//! Reading a long novel-sized PDF with a model's help needs three things
//! glued together well: reliable per-page text extraction, prompt
//! construction with explicit context budgets, and a streaming chat whose
//! partial answers are observable while they arrive. This crate keeps all
//! three behind a single state store with pure transition functions, so
//! every screen of the application is a projection of one struct and every
//! behaviour is testable without a UI runtime or a network connection.
//!
//! ## Flow Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Extract   per-page text via lopdf (CPU-bound, spawn_blocking)
//!  ├─ 2. Store     AppState reducer applies events, notifies observers
//!  ├─ 3. Generate  summarise / refine / translate via Gemini REST
//!  ├─ 4. Chat      streamGenerateContent?alt=sse → fragment aggregation
//!  └─ 5. Render    pure AppState → Screen projection
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lectura::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GEMINI_API_KEY
//!     let mut session = Session::new(SessionConfig::from_env());
//!
//!     let bytes = std::fs::read("novel.pdf")?;
//!     session.handle_upload(bytes, "novel.pdf", "application/pdf").await?;
//!
//!     session.set_summary_question("Who is the narrator?");
//!     session.generate_summary().await;
//!     println!("{}", session.state().summary_raw);
//!
//!     session.send_chat_message("How does the first chapter end?").await;
//!     println!("{}", session.state().conversation.last().unwrap().text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lectura` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! lectura = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod adapter;
mod chat;
pub mod config;
pub mod error;
pub mod format;
pub mod observer;
pub mod prompts;
pub mod session;
pub mod state;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use adapter::extract::{extract_text, PDF_MIME_TYPE};
pub use adapter::gemini::{
    FragmentStream, GeminiClient, GenerationClient, DEFAULT_API_BASE_URL, DEFAULT_MODEL,
};
pub use config::{
    SessionConfig, SessionConfigBuilder, DEFAULT_CHAT_CONTEXT_CHARS,
    DEFAULT_REFINE_CONTEXT_CHARS, DEFAULT_SUMMARY_CONTEXT_CHARS,
};
pub use error::LecturaError;
pub use observer::{NoopObserver, SessionObserver};
pub use session::Session;
pub use state::{
    AppState, Document, Event, Role, TranslationStatus, Turn, View, CHAT_ERROR_MESSAGE,
    SUMMARY_ERROR_MESSAGE, TRANSLATION_ERROR_MESSAGE,
};
pub use view::{available_views, render, ChatScreen, Screen, SummaryScreen, TranslateScreen, UploadScreen};
