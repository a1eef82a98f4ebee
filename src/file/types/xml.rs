use crate::capability::{Capabilities, Capability};
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::file::types::markup::xml_to_text;
use crate::models::SupportedFormat;
use crate::utils::read_text_lossy;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// XML (.xml) file handler: concatenated character data
pub struct XmlFile {
    path: PathBuf,
}

impl XmlFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TextSource for XmlFile {
    async fn to_text_impl(&self, caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        let strict = caps.ensure(Capability::StrictMarkup);
        run_blocking("XML text extraction failed", move || {
            let source = read_text_lossy(&path)?;
            Ok(xml_to_text(&source, strict))
        })
        .await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Markup)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Xml
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::Builder;

    #[tokio::test]
    async fn test_xml_file_extraction() {
        let temp_file = Builder::new().suffix(".xml").tempfile().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"<?xml version="1.0"?><notes><note id="1">Buy milk</note><note>Call &quot;Bob&quot;</note></notes>"#,
        )
        .unwrap();

        let xml_file = XmlFile::new(temp_file.path().to_path_buf());
        let text = xml_file.to_text(&Capabilities::all()).await.unwrap();
        assert_eq!(text, "Buy milkCall \"Bob\"");
        assert_eq!(xml_file.format(), SupportedFormat::Xml);
    }

    #[tokio::test]
    async fn test_xml_malformed_still_yields_text() {
        let temp_file = Builder::new().suffix(".xml").tempfile().unwrap();
        std::fs::write(temp_file.path(), "<root><open>dangling</root>").unwrap();

        let xml_file = XmlFile::new(temp_file.path().to_path_buf());
        let text = xml_file.to_text(&Capabilities::all()).await.unwrap();
        assert_eq!(text, "dangling");
    }

    #[tokio::test]
    async fn test_xml_missing_file_fails() {
        let xml_file = XmlFile::new(PathBuf::from("/nonexistent/notes.xml"));
        let err = xml_file.to_text(&Capabilities::all()).await.unwrap_err();
        assert!(err.to_string().starts_with("[ERROR] XML text extraction failed: "));
    }
}
