use crate::constants::{HTML_EXTENSIONS, IMAGE_EXTENSIONS};
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Document family an input is routed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedFormat {
    Pdf,
    Docx,
    /// Legacy binary Word; recognized but never extracted
    Doc,
    Odt,
    Rtf,
    Html,
    Xml,
    Pages,
    Image,
    Unknown,
}

/// One classification rule: extensions that select the format, and an
/// optional MIME substring that selects it when no extension rule matched
struct Rule {
    format: SupportedFormat,
    extensions: &'static [&'static str],
    mime_hint: Option<&'static str>,
}

/// Classification rules in precedence order
const RULES: &[Rule] = &[
    Rule { format: SupportedFormat::Pdf, extensions: &[".pdf"], mime_hint: Some("pdf") },
    Rule { format: SupportedFormat::Docx, extensions: &[".docx"], mime_hint: None },
    Rule { format: SupportedFormat::Doc, extensions: &[".doc"], mime_hint: None },
    Rule { format: SupportedFormat::Odt, extensions: &[".odt"], mime_hint: None },
    Rule { format: SupportedFormat::Rtf, extensions: &[".rtf"], mime_hint: None },
    Rule { format: SupportedFormat::Html, extensions: HTML_EXTENSIONS, mime_hint: Some("html") },
    Rule { format: SupportedFormat::Xml, extensions: &[".xml"], mime_hint: Some("xml") },
    Rule { format: SupportedFormat::Pages, extensions: &[".pages"], mime_hint: None },
    Rule { format: SupportedFormat::Image, extensions: IMAGE_EXTENSIONS, mime_hint: None },
];

impl SupportedFormat {
    /// Classify by extension first; only when no extension rule matches is
    /// the MIME type substring-matched, in the same rule order.
    pub fn classify(ext: &str, mime: &str) -> Self {
        let ext = ext.to_lowercase();
        if let Some(rule) = RULES.iter().find(|rule| rule.extensions.contains(&ext.as_str())) {
            return rule.format;
        }

        RULES
            .iter()
            .find(|rule| rule.mime_hint.is_some_and(|hint| mime.contains(hint)))
            .map(|rule| rule.format)
            .unwrap_or(SupportedFormat::Unknown)
    }

    pub fn name(self) -> &'static str {
        match self {
            SupportedFormat::Pdf => "pdf",
            SupportedFormat::Docx => "docx",
            SupportedFormat::Doc => "doc",
            SupportedFormat::Odt => "odt",
            SupportedFormat::Rtf => "rtf",
            SupportedFormat::Html => "html",
            SupportedFormat::Xml => "xml",
            SupportedFormat::Pages => "pages",
            SupportedFormat::Image => "image",
            SupportedFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the dispatcher knows about an input before extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMeta {
    /// Path as given by the caller
    pub path: PathBuf,
    /// Lowercase extension with its dot, empty when absent
    pub extension: String,
    /// Guessed MIME type, empty when unknown
    pub mime: String,
    pub format: SupportedFormat,
}

impl FileMeta {
    /// Derive extension, MIME type and format from a path. Does not touch the filesystem.
    pub fn from_path(path: &Path) -> Self {
        let extension = utils::get_extension(path);
        let mime = utils::guess_mime(path);
        let format = SupportedFormat::classify(&extension, &mime);
        Self {
            path: path.to_path_buf(),
            extension,
            mime,
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(SupportedFormat::classify(".pdf", ""), SupportedFormat::Pdf);
        assert_eq!(SupportedFormat::classify(".docx", ""), SupportedFormat::Docx);
        assert_eq!(SupportedFormat::classify(".doc", ""), SupportedFormat::Doc);
        assert_eq!(SupportedFormat::classify(".odt", ""), SupportedFormat::Odt);
        assert_eq!(SupportedFormat::classify(".rtf", ""), SupportedFormat::Rtf);
        assert_eq!(SupportedFormat::classify(".html", ""), SupportedFormat::Html);
        assert_eq!(SupportedFormat::classify(".htm", ""), SupportedFormat::Html);
        assert_eq!(SupportedFormat::classify(".xml", ""), SupportedFormat::Xml);
        assert_eq!(SupportedFormat::classify(".pages", ""), SupportedFormat::Pages);
        for ext in [".jpg", ".jpeg", ".png", ".tif", ".tiff", ".bmp", ".gif"] {
            assert_eq!(SupportedFormat::classify(ext, ""), SupportedFormat::Image);
        }
    }

    #[test]
    fn test_classify_extension_case_insensitive() {
        assert_eq!(SupportedFormat::classify(".PDF", ""), SupportedFormat::Pdf);
    }

    #[test]
    fn test_classify_by_mime_fallback() {
        assert_eq!(SupportedFormat::classify("", "application/pdf"), SupportedFormat::Pdf);
        assert_eq!(
            SupportedFormat::classify(".xhtml", "application/xhtml+xml"),
            SupportedFormat::Html
        );
        assert_eq!(SupportedFormat::classify(".svg", "image/svg+xml"), SupportedFormat::Xml);
    }

    #[test]
    fn test_extension_wins_over_mime() {
        assert_eq!(
            SupportedFormat::classify(".docx", "application/pdf"),
            SupportedFormat::Docx
        );
        assert_eq!(SupportedFormat::classify(".xml", "text/html"), SupportedFormat::Xml);
        assert_eq!(SupportedFormat::classify(".png", "application/pdf"), SupportedFormat::Image);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(SupportedFormat::classify(".xyz", ""), SupportedFormat::Unknown);
        assert_eq!(SupportedFormat::classify("", ""), SupportedFormat::Unknown);
        assert_eq!(SupportedFormat::classify(".txt", "text/plain"), SupportedFormat::Unknown);
    }

    #[test]
    fn test_file_meta_from_path() {
        let meta = FileMeta::from_path(Path::new("/docs/Report.PDF"));
        assert_eq!(meta.extension, ".pdf");
        assert_eq!(meta.mime, "application/pdf");
        assert_eq!(meta.format, SupportedFormat::Pdf);
        assert_eq!(meta.path, PathBuf::from("/docs/Report.PDF"));
    }

    #[test]
    fn test_file_meta_without_extension() {
        let meta = FileMeta::from_path(Path::new("/docs/README"));
        assert_eq!(meta.extension, "");
        assert_eq!(meta.mime, "");
        assert_eq!(meta.format, SupportedFormat::Unknown);
    }

    #[test]
    fn test_file_meta_serialization() {
        let meta = FileMeta::from_path(Path::new("/docs/page.html"));
        let serialized = serde_json::to_string(&meta).unwrap();
        let deserialized: FileMeta = serde_json::from_str(&serialized).unwrap();
        assert_eq!(meta, deserialized);
        assert!(serialized.contains("\"format\":\"html\""));
    }
}
