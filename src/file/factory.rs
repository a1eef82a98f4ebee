use crate::config::OcrConfig;
use crate::file::types::{
    DocxFile, HtmlFile, ImageFile, OdtFile, PagesFile, PdfFile, RtfFile, XmlFile,
};
use crate::file::TextSource;
use crate::models::{FileMeta, SupportedFormat};
use std::path::PathBuf;
use std::sync::Arc;

/// Factory for creating TextSource instances based on the classified format
pub struct FileFactory;

impl FileFactory {
    /// Create a TextSource from FileMeta
    pub fn create_from_meta(meta: &FileMeta, ocr: &OcrConfig) -> Option<Arc<dyn TextSource>> {
        Self::create(meta.path.clone(), meta.format, ocr)
    }

    /// Create a TextSource for a format. Formats without an extractor
    /// (legacy .doc, unknown) yield `None`.
    pub fn create(
        path: PathBuf,
        format: SupportedFormat,
        ocr: &OcrConfig,
    ) -> Option<Arc<dyn TextSource>> {
        let source: Arc<dyn TextSource> = match format {
            SupportedFormat::Pdf => Arc::new(PdfFile::new(path)),
            SupportedFormat::Docx => Arc::new(DocxFile::new(path)),
            SupportedFormat::Odt => Arc::new(OdtFile::new(path)),
            SupportedFormat::Rtf => Arc::new(RtfFile::new(path)),
            SupportedFormat::Html => Arc::new(HtmlFile::new(path)),
            SupportedFormat::Xml => Arc::new(XmlFile::new(path)),
            SupportedFormat::Pages => Arc::new(PagesFile::new(path)),
            SupportedFormat::Image => Arc::new(ImageFile::new(path, ocr.clone())),
            SupportedFormat::Doc | SupportedFormat::Unknown => return None,
        };
        Some(source)
    }
}
