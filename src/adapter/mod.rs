//! Boundary adapters around the two external collaborators.
//!
//! Each submodule wraps exactly one third-party surface behind a minimal
//! operation-level contract, so the state store and the chat loop never
//! see a PDF library or an HTTP client.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ extract ──▶ AppState ──▶ gemini ──▶ AppState
//! (bytes)    (lopdf)     (document)   (REST/SSE)  (results, fragments)
//! ```
//!
//! 1. [`extract`] — per-page PDF text extraction; runs in `spawn_blocking`
//!    because lopdf is synchronous and CPU-bound
//! 2. [`gemini`]  — the [`gemini::GenerationClient`] seam and its
//!    production implementation over the Gemini REST API; the only module
//!    with network I/O

pub mod extract;
pub mod gemini;
