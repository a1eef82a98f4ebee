use crate::capability::{Capabilities, Capability};
use crate::error::{ConvertError, ExtractionResult};
use crate::models::SupportedFormat;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};

/// Trait for turning one file of a given format into raw text
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Extract raw text (internal implementation)
    async fn to_text_impl(&self, caps: &Capabilities) -> ExtractionResult;

    /// Extract raw text (public API with capability check)
    async fn to_text(&self, caps: &Capabilities) -> ExtractionResult {
        if let Some(required) = self.required_capability() {
            if !caps.ensure(required) {
                warn!(
                    "Backend {} unavailable, skipping {}",
                    required,
                    self.path().display()
                );
                return Err(ConvertError::MissingCapability(required));
            }
        }

        debug!("Extracting {} as {}", self.path().display(), self.format());
        self.to_text_impl(caps).await
    }

    /// Backend that must be available before extraction is attempted
    fn required_capability(&self) -> Option<Capability>;

    /// Format this source handles
    fn format(&self) -> SupportedFormat;

    /// Get the file path
    fn path(&self) -> &Path;
}

/// Run blocking extraction work off the async executor. Errors, and panics
/// raised by third-party parsers, come back as extraction failures.
pub(crate) async fn run_blocking<F>(context: &'static str, work: F) -> ExtractionResult
where
    F: FnOnce() -> anyhow::Result<String> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(ConvertError::failed(context, format!("{err:#}"))),
        Err(join_err) => Err(ConvertError::failed(context, join_err)),
    }
}
