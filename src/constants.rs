/// Constants used throughout doctext
/// This module centralizes extension tables, fixed messages and layout defaults

/// Column width paragraphs are rewrapped to by the normalizer
pub const DEFAULT_WRAP_WIDTH: usize = 80;

/// Raster image extensions routed to OCR (lowercase, with the dot)
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".tif", ".tiff", ".bmp", ".gif",
];

/// HTML extensions (lowercase, with the dot)
pub const HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Elements whose character data is never visible text in an HTML page
pub const HTML_INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Entry holding the document body inside older Pages bundles
pub const PAGES_INDEX_ENTRY: &str = "index.xml";

/// Entry holding the rendered preview inside Pages bundles
pub const PAGES_PREVIEW_ENTRY: &str = "QuickLook/Preview.pdf";

/// Main document part of a DOCX package
pub const DOCX_DOCUMENT_ENTRY: &str = "word/document.xml";

/// Content part of an ODF package
pub const ODT_CONTENT_ENTRY: &str = "content.xml";

/// Default OCR engine executable
pub const DEFAULT_OCR_COMMAND: &str = "tesseract";

/// Default OCR language
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Default config file locations, tried in order
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config/settings.toml",
    "./config/settings.toml",
    "~/.config/doctext/settings.toml",
];
