use crate::capability::{Capabilities, Capability};
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::models::SupportedFormat;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// PDF file handler: text layer only, no OCR for scanned pages
pub struct PdfFile {
    path: PathBuf,
}

impl PdfFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Read the text layer of every page. Falls back to pdf-extract when the
/// page walk yields nothing.
fn extract_pdf_text(path: &Path) -> Result<String> {
    use lopdf::Document;

    let doc = Document::load(path)
        .with_context(|| format!("Failed to load PDF: {}", path.display()))?;

    let mut text_content = String::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => {
                text_content.push_str(&page_text);
                text_content.push('\n');
            }
            Err(e) => debug!("No text layer on page {} of {}: {}", page_num, path.display(), e),
        }
    }

    if !text_content.trim().is_empty() {
        return Ok(text_content);
    }

    debug!("Page walk found no text in {}, trying pdf-extract", path.display());
    fallback_text(path, pdf_extract::extract_text(path))
}

/// An empty text layer is only trusted when the fallback reader succeeded
fn fallback_text<E: std::fmt::Display>(
    path: &Path,
    extracted: std::result::Result<String, E>,
) -> Result<String> {
    extracted
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("Failed to extract PDF text: {}", path.display()))
}

#[async_trait]
impl TextSource for PdfFile {
    async fn to_text_impl(&self, _caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        run_blocking("PDF text extraction failed", move || extract_pdf_text(&path)).await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Pdf)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Pdf
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
