use std::path::Path;
use std::process::Command;

use super::ExtractError;

/// Recognize text on a single scanned PDF page.
///
/// The page is rasterized to PNG with `pdftoppm` in a scratch directory, then
/// handed to `tesseract`. Both tools must be on PATH; callers treat any
/// failure here as "no text on this page".
pub fn ocr_pdf_page(pdf: &Path, page_number: u32) -> Result<String, ExtractError> {
    let dir = tempfile::tempdir()?;
    let prefix = dir.path().join("page");
    let page_arg = page_number.to_string();

    let status = Command::new("pdftoppm")
        .args(["-f", &page_arg, "-l", &page_arg, "-r", "300", "-png"])
        .arg(pdf)
        .arg(&prefix)
        .status()?;
    if !status.success() {
        return Err(ExtractError::Ocr(format!("pdftoppm exited with {}", status)));
    }

    // pdftoppm zero-pads the page suffix depending on the page count, so
    // locate whatever PNG it produced rather than guessing the name.
    let image = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|p| p.extension().is_some_and(|e| e == "png"))
        .ok_or_else(|| ExtractError::Ocr("pdftoppm produced no image".to_string()))?;

    let output = Command::new("tesseract").arg(&image).arg("stdout").output()?;
    if !output.status.success() {
        return Err(ExtractError::Ocr(format!(
            "tesseract exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
