use crate::capability::{Capabilities, Capability};
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::file::types::markup::html_to_text;
use crate::models::SupportedFormat;
use crate::utils::read_text_lossy;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// HTML (.html/.htm) file handler: visible text, tags removed
pub struct HtmlFile {
    path: PathBuf,
}

impl HtmlFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TextSource for HtmlFile {
    async fn to_text_impl(&self, caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        let strict = caps.ensure(Capability::StrictMarkup);
        run_blocking("HTML text extraction failed", move || {
            let source = read_text_lossy(&path)?;
            Ok(html_to_text(&source, strict))
        })
        .await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Markup)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Html
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
