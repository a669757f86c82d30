//! Deterministic text transforms shared by the extraction and view layers.
//!
//! Two concerns live here:
//!
//! 1. **Display formatting** — summaries come back from the model as plain
//!    text with `\n` paragraph breaks; screens render them with `<br>`
//!    markers instead. [`line_breaks_to_html`] is that transform, kept as a
//!    pure function so the derived "formatted" summary never drifts from the
//!    raw one.
//!
//! 2. **Extracted-text normalisation** — PDF text extraction produces
//!    ragged whitespace (trailing spaces, runs of blank lines inside a
//!    page). [`normalize_page_text`] applies cheap deterministic cleanup so
//!    prompt budgets are spent on content, not padding.
//!
//! Every function here is `&str → String` with no shared state.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replace every newline with an HTML line break.
///
/// This is idempotent: the output contains no `\n`, so a second pass
/// returns the input unchanged.
pub fn line_breaks_to_html(text: &str) -> String {
    text.replace('\n', "<br>")
}

static RE_BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalise one page's extracted text.
///
/// Trims trailing whitespace per line, collapses runs of 3+ newlines down
/// to a single blank line, and strips leading/trailing blank space so the
/// page joins cleanly with the document-level blank-line separator.
pub fn normalize_page_text(text: &str) -> String {
    let trimmed = text
        .replace("\r\n", "\n")
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    RE_BLANK_RUNS
        .replace_all(&trimmed, "\n\n")
        .trim()
        .to_string()
}

/// Join per-page texts into the document text: one blank line between pages.
///
/// Pages arrive already normalised and in ascending page order; this is the
/// only place the page separator is defined.
pub fn assemble_document_text(pages: Vec<String>) -> String {
    pages.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_literal() {
        assert_eq!(line_breaks_to_html("a\nb"), "a<br>b");
    }

    #[test]
    fn line_breaks_idempotent() {
        let once = line_breaks_to_html("uno\ndos\n\ntres");
        let twice = line_breaks_to_html(&once);
        assert_eq!(once, twice);
        assert!(!once.contains('\n'));
    }

    #[test]
    fn line_breaks_no_newlines_is_identity() {
        assert_eq!(line_breaks_to_html("plain text"), "plain text");
    }

    #[test]
    fn normalize_trims_and_collapses() {
        let raw = "line one   \nline two\n\n\n\nline three\n\n";
        assert_eq!(normalize_page_text(raw), "line one\nline two\n\nline three");
    }

    #[test]
    fn normalize_crlf() {
        assert_eq!(normalize_page_text("a\r\nb"), "a\nb");
    }

    #[test]
    fn assemble_separates_pages_with_blank_line() {
        let doc = assemble_document_text(vec!["page one".into(), "page two".into()]);
        assert_eq!(doc, "page one\n\npage two");
    }

    #[test]
    fn assemble_single_page_has_no_separator() {
        assert_eq!(assemble_document_text(vec!["only".into()]), "only");
    }
}
