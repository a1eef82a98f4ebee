pub mod archive;
pub mod docx;
pub mod html;
pub mod image;
pub mod markup;
pub mod odt;
pub mod pages;
pub mod pdf;
pub mod rtf;
pub mod xml;

pub use docx::DocxFile;
pub use html::HtmlFile;
pub use image::ImageFile;
pub use odt::OdtFile;
pub use pages::PagesFile;
pub use pdf::PdfFile;
pub use rtf::RtfFile;
pub use xml::XmlFile;
