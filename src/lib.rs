pub mod capability;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod file;
pub mod models;
pub mod normalize;
pub mod utils;

#[cfg(test)]
#[path = "../tests/fixtures/mod.rs"]
mod test_support;

pub use capability::{Capabilities, Capability};
pub use dispatch::{convert_to_text, Converter};
pub use error::{ConvertError, ExtractionResult, FailureKind};
pub use file::TextSource;
pub use models::{FileMeta, SupportedFormat};
pub use normalize::{normalize, Normalizer};
