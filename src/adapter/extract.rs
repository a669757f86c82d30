//! PDF text extraction: uploaded bytes → one document string.
//!
//! ## Why spawn_blocking?
//!
//! lopdf parses and decodes synchronously and is CPU-bound on large
//! documents. `tokio::task::spawn_blocking` moves the work onto the
//! blocking thread pool so the event loop keeps serving other user
//! actions while a novel-sized PDF decodes.
//!
//! ## Atomicity
//!
//! Extraction is all-or-nothing: the declared MIME type is checked before
//! any byte is read, and a decode error on any page discards the pages
//! already extracted. Callers never observe partial text.

use crate::error::LecturaError;
use crate::format;
use lopdf::Document as PdfDocument;
use tracing::debug;

/// The only MIME type the upload surface accepts.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Extract the full text of a PDF.
///
/// Pages are decoded in ascending page order; each page's text is
/// normalised and the pages are joined with one blank line.
///
/// # Errors
/// - [`LecturaError::NotAPdf`] when `declared_mime` is not
///   `application/pdf` (the bytes are never touched)
/// - [`LecturaError::CorruptPdf`] when the document fails to open
/// - [`LecturaError::ExtractionFailed`] when any page fails to decode
pub async fn extract_text(
    bytes: Vec<u8>,
    file_name: &str,
    declared_mime: &str,
) -> Result<String, LecturaError> {
    if declared_mime != PDF_MIME_TYPE {
        return Err(LecturaError::NotAPdf {
            mime: declared_mime.to_string(),
        });
    }

    let file_name = file_name.to_string();
    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes, &file_name))
        .await
        .map_err(|e| LecturaError::Internal(format!("extraction task panicked: {e}")))?
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(bytes: &[u8], file_name: &str) -> Result<String, LecturaError> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| LecturaError::CorruptPdf {
        file_name: file_name.to_string(),
        detail: e.to_string(),
    })?;

    // get_pages() is a BTreeMap keyed by 1-based page number, so iteration
    // order is the page order.
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(pages = page_numbers.len(), file_name, "PDF opened");

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page_num in page_numbers {
        let text = doc
            .extract_text(&[page_num])
            .map_err(|e| LecturaError::ExtractionFailed {
                page: page_num,
                detail: e.to_string(),
            })?;
        pages.push(format::normalize_page_text(&text));
    }

    Ok(format::assemble_document_text(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build an in-memory PDF with one page per entry in `page_texts`.
    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn rejects_non_pdf_mime_before_reading_bytes() {
        // Deliberately invalid bytes: the MIME gate must fire first.
        let err = extract_text(vec![0xDE, 0xAD], "notes.txt", "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, LecturaError::NotAPdf { ref mime } if mime == "text/plain"));
    }

    #[tokio::test]
    async fn rejects_garbage_bytes_with_declared_pdf_mime() {
        let err = extract_text(b"not a pdf at all".to_vec(), "fake.pdf", PDF_MIME_TYPE)
            .await
            .unwrap_err();
        assert!(matches!(err, LecturaError::CorruptPdf { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn extracts_pages_in_order_separated_by_blank_line() {
        let bytes = build_pdf(&["First page text", "Second page text"]);
        let text = extract_text(bytes, "two.pdf", PDF_MIME_TYPE)
            .await
            .expect("extraction should succeed");

        let first = text.find("First page text").expect("first page present");
        let second = text.find("Second page text").expect("second page present");
        assert!(first < second, "pages out of order: {text:?}");
        assert!(
            text.contains("\n\n"),
            "pages must be separated by a blank line: {text:?}"
        );
    }

    #[tokio::test]
    async fn single_page_document_round_trips() {
        let bytes = build_pdf(&["Only page"]);
        let text = extract_text(bytes, "one.pdf", PDF_MIME_TYPE).await.unwrap();
        assert!(text.contains("Only page"));
    }
}
