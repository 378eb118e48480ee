//! PDF text extraction: pull each page's text layer out with `lopdf`.
//!
//! ## Why spawn_blocking?
//!
//! Parsing a PDF walks the whole cross-reference table and inflates every
//! content stream, which is pure CPU work. `tokio::task::spawn_blocking`
//! moves it onto the blocking thread pool so a large upload cannot stall
//! the async workers serving other requests.
//!
//! ## Page joining
//!
//! Per-page text is trimmed and pages are joined with a blank line. That
//! makes every page boundary a topic boundary for the segmenter, no matter
//! how the extractor happened to terminate the page's last line.

use lopdf::Document;
use tracing::{debug, info};

use crate::error::{Result, SummarizeError};

/// Plain text pulled from a PDF, plus how many pages produced it.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Trimmed per-page text joined with blank lines, in page order.
    pub text: String,
    pub page_count: usize,
}

/// Extract the text layer of every page, in document order.
///
/// This runs inside `spawn_blocking` since PDF parsing is CPU-bound.
pub async fn extract_text(bytes: Vec<u8>) -> Result<ExtractedText> {
    tokio::task::spawn_blocking(move || extract_text_blocking(&bytes))
        .await
        .map_err(|e| SummarizeError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of text extraction.
pub fn extract_text_blocking(bytes: &[u8]) -> Result<ExtractedText> {
    let document = Document::load_mem(bytes).map_err(|e| SummarizeError::InvalidPdf {
        detail: e.to_string(),
    })?;

    if document.is_encrypted() {
        return Err(SummarizeError::EncryptedPdf);
    }

    let pages = document.get_pages();
    let page_count = pages.len();
    info!("PDF loaded: {} pages", page_count);

    let mut page_texts = Vec::with_capacity(page_count);
    for (page_num, _page_id) in pages {
        let raw = document
            .extract_text(&[page_num])
            .map_err(|e| SummarizeError::ExtractionFailed {
                page: page_num,
                detail: e.to_string(),
            })?;
        debug!("Extracted page {}: {} chars", page_num, raw.len());
        page_texts.push(raw.trim().to_string());
    }

    Ok(ExtractedText {
        text: page_texts.join("\n\n"),
        page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream};

    fn make_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let page_tree_id = doc.new_object_id();

        let font_id = doc.add_object(lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let resources_id = doc.add_object(lopdf::Dictionary::from_iter([(
            "Font",
            Object::Dictionary(lopdf::Dictionary::from_iter([(
                "F1",
                Object::Reference(font_id),
            )])),
        )]));

        let mut kids = Vec::new();
        for page_text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                lopdf::Dictionary::new(),
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(lopdf::Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(page_tree_id)),
                ("Contents", Object::Reference(content_id)),
                ("Resources", Object::Reference(resources_id)),
                (
                    "MediaBox",
                    Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
                ),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            page_tree_id,
            Object::Dictionary(lopdf::Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );
        let catalog_id = doc.add_object(lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(page_tree_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn extracts_pages_in_document_order() {
        let bytes = make_pdf(&["alpha page", "bravo page", "charlie page"]);
        let out = extract_text_blocking(&bytes).unwrap();

        assert_eq!(out.page_count, 3);
        let alpha = out.text.find("alpha").unwrap();
        let bravo = out.text.find("bravo").unwrap();
        let charlie = out.text.find("charlie").unwrap();
        assert!(alpha < bravo && bravo < charlie, "got: {}", out.text);
    }

    #[test]
    fn page_boundaries_become_blank_lines() {
        let bytes = make_pdf(&["first page text", "second page text"]);
        let out = extract_text_blocking(&bytes).unwrap();

        let topics: Vec<&str> = out.text.split("\n\n").collect();
        assert_eq!(topics.len(), 2, "got: {}", out.text);
        assert!(topics[0].contains("first page text"));
        assert!(topics[1].contains("second page text"));
    }

    /// Structurally valid PDF whose trailer declares the standard security
    /// handler. The streams themselves are left in the clear; the encryption
    /// check fires on the declaration alone.
    fn make_encrypted_pdf() -> Vec<u8> {
        let mut doc = Document::load_mem(&make_pdf(&["secret page"])).unwrap();
        let encrypt_id = doc.add_object(lopdf::Dictionary::from_iter([
            ("Filter", Object::Name(b"Standard".to_vec())),
            ("V", Object::Integer(1)),
            ("R", Object::Integer(2)),
            ("O", Object::string_literal(vec![0u8; 32])),
            ("U", Object::string_literal(vec![0u8; 32])),
            ("P", Object::Integer(-44)),
        ]));
        doc.trailer.set("Encrypt", Object::Reference(encrypt_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn rejects_bytes_that_are_not_a_pdf() {
        let err = extract_text_blocking(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidPdf { .. }), "got: {err}");
    }

    #[test]
    fn rejects_encrypted_pdfs() {
        let err = extract_text_blocking(&make_encrypted_pdf()).unwrap_err();
        assert!(matches!(err, SummarizeError::EncryptedPdf), "got: {err}");
    }

    #[tokio::test]
    async fn async_wrapper_extracts() {
        let bytes = make_pdf(&["hello from async"]);
        let out = extract_text(bytes).await.unwrap();
        assert_eq!(out.page_count, 1);
        assert!(out.text.contains("hello from async"));
    }
}
