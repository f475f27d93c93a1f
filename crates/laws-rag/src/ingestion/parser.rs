//! Source document text extraction

use std::path::Path;

use crate::error::{Error, Result};

/// Document formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PDF, extracted page by page
    Pdf,
    /// UTF-8 plain text or markdown
    Text,
}

impl DocumentFormat {
    /// Detect format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" | "markdown" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Read a document and return its full text in reading order.
///
/// PDF pages are joined with a single newline.
pub fn load_document_text(path: &Path) -> Result<String> {
    let path_str = path.display().to_string();

    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| Error::document_unreadable(&path_str, "unsupported document type"))?;

    let data = std::fs::read(path).map_err(|e| Error::document_unreadable(&path_str, e.to_string()))?;

    let text = match format {
        DocumentFormat::Pdf => extract_pdf_text(&path_str, &data)?,
        DocumentFormat::Text => String::from_utf8(data)
            .map_err(|e| Error::document_unreadable(&path_str, format!("invalid UTF-8: {}", e)))?,
    };

    tracing::info!("Loaded {} characters from {}", text.len(), path_str);
    Ok(text)
}

fn extract_pdf_text(path_str: &str, data: &[u8]) -> Result<String> {
    let text = match extract_pages(data) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!("Page extraction produced no text for {}, trying pdf-extract", path_str);
            extract_whole(path_str, data)?
        }
        Err(reason) => {
            tracing::warn!("Page extraction failed for {}: {}, trying pdf-extract", path_str, reason);
            extract_whole(path_str, data)?
        }
    };

    let text = cleanup_pdf_text(&text);
    if text.trim().is_empty() {
        return Err(Error::document_unreadable(
            path_str,
            "no text content could be extracted from PDF",
        ));
    }

    Ok(text)
}

/// Per-page extraction with lopdf, concatenated in page order
fn extract_pages(data: &[u8]) -> std::result::Result<String, String> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| format!("failed to load PDF: {}", e))?;

    // get_pages is a BTreeMap keyed by page number, so iteration is in reading order
    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::debug!("Could not extract text for page {}: {}", page_number, e);
                pages.push(String::new());
            }
        }
    }

    Ok(pages.join("\n"))
}

fn extract_whole(path_str: &str, data: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed font tables
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(Error::document_unreadable(
            path_str,
            format!("failed to extract PDF text: {}", e),
        )),
        Err(_) => Err(Error::document_unreadable(path_str, "PDF extraction crashed")),
    }
}

/// Replace ligatures and typographic characters PDF fonts commonly produce
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace('\u{00A0}', " ")
}
