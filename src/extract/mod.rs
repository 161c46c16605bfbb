mod docx;
mod ocr;

use std::fs;
use std::path::Path;

use lopdf::Document;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Extract the text of an uploaded file, dispatching on its lowercase
/// extension. Unsupported extensions yield `Ok(None)`.
pub fn extract_file(path: &Path) -> Result<Option<String>, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") => Ok(Some(fs::read_to_string(path)?)),
        Some("pdf") => extract_pdf(path).map(Some),
        Some("docx") => docx::extract_docx(path).map(Some),
        _ => Ok(None),
    }
}

/// Per-page text extraction. A page whose embedded text is empty or
/// whitespace is assumed to be scanned; that page is rasterized and run
/// through OCR instead. OCR trouble downgrades to an empty page with a
/// warning, never a hard failure of the whole document.
fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let doc = Document::load(path)?;
    let mut pages = Vec::new();
    for (&page_number, _) in doc.get_pages().iter() {
        let mut text = doc.extract_text(&[page_number]).unwrap_or_default();
        if text.trim().is_empty() {
            text = match ocr::ocr_pdf_page(path, page_number) {
                Ok(recognized) => recognized,
                Err(e) => {
                    tracing::warn!("OCR fallback failed on page {}: {}", page_number, e);
                    String::new()
                }
            };
        }
        pages.push(text);
    }
    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn txt_files_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "plain text body").unwrap();
        let text = extract_file(file.path()).unwrap();
        assert_eq!(text.as_deref(), Some("plain text body"));
    }

    #[test]
    fn extension_is_matched_case_insensitively() {
        let mut file = tempfile::Builder::new().suffix(".TXT").tempfile().unwrap();
        write!(file, "shouty extension").unwrap();
        let text = extract_file(file.path()).unwrap();
        assert_eq!(text.as_deref(), Some("shouty extension"));
    }

    #[test]
    fn unsupported_extension_yields_none() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(extract_file(file.path()).unwrap().is_none());

        let no_ext = tempfile::Builder::new().tempfile().unwrap();
        assert!(extract_file(no_ext.path()).unwrap().is_none());
    }

    #[test]
    fn missing_txt_file_is_an_io_error() {
        let err = extract_file(Path::new("/nonexistent/notes.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
