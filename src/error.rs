//! Error types for the lectura library.
//!
//! Every failure in the crate maps to one of a small set of variants,
//! mirroring the three user-visible failure classes:
//!
//! * **Upload validation** ([`LecturaError::NotAPdf`]) — the file was never
//!   touched; the caller should alert and stay on the upload screen.
//!
//! * **Extraction** ([`LecturaError::CorruptPdf`],
//!   [`LecturaError::ExtractionFailed`]) — the PDF library failed on load or
//!   on a page. Extraction is atomic: no partial text is ever surfaced, and
//!   the session resets to the upload screen.
//!
//! * **Generation** ([`LecturaError::GenerationFailed`],
//!   [`LecturaError::ApiKeyMissing`]) — the remote model call failed. These
//!   never reach the caller as errors; the session logs the cause and writes
//!   a fixed user-facing message into the relevant result field instead.
//!
//! Nothing here is fatal: every path leaves the session usable.

use thiserror::Error;

/// All errors produced by the lectura library.
#[derive(Debug, Error)]
pub enum LecturaError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// The uploaded file's declared MIME type is not `application/pdf`.
    ///
    /// Checked before any byte of the file is read.
    #[error("Not a PDF: declared type is '{mime}'\nOnly application/pdf uploads are accepted.")]
    NotAPdf { mime: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF could not be opened at all (corrupt header, bad xref, …).
    #[error("Could not open PDF '{file_name}': {detail}")]
    CorruptPdf { file_name: String, detail: String },

    /// A page failed to decode. The whole extraction is discarded.
    #[error("Text extraction failed on page {page}: {detail}")]
    ExtractionFailed { page: u32, detail: String },

    // ── Generation errors ─────────────────────────────────────────────────
    /// No API key was configured. Startup proceeds without one; every
    /// generation call fails with this variant until a key is provided.
    #[error("GEMINI_API_KEY is not set.\nExport it before starting: export GEMINI_API_KEY=...")]
    ApiKeyMissing,

    /// The Gemini API returned an error, or the response/stream could not
    /// be decoded. The detail is for logs only, never for end users.
    #[error("Generation request failed: {detail}")]
    GenerationFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (panicked blocking task, …).
    #[error("Internal error: {0}")]
    Internal(String),
}
