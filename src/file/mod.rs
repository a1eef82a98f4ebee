pub mod factory;
pub mod r#trait;
pub mod types;

pub use factory::FileFactory;
pub use r#trait::TextSource;
pub use types::{DocxFile, HtmlFile, ImageFile, OdtFile, PagesFile, PdfFile, RtfFile, XmlFile};
