//! Single entry point of the pipeline: classify a file, run its extractor,
//! reflow the result.

use crate::capability::Capabilities;
use crate::config::{Config, OcrConfig};
use crate::error::{ConvertError, ExtractionResult};
use crate::file::FileFactory;
use crate::models::{FileMeta, SupportedFormat};
use crate::normalize::Normalizer;
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing::{debug, warn};

static CONVERTER: OnceCell<Converter> = OnceCell::new();

/// Routes files to extractors under a fixed capability set
#[derive(Debug, Clone)]
pub struct Converter {
    capabilities: Capabilities,
    /// `None` returns raw extractor output
    normalizer: Option<Normalizer>,
    ocr: OcrConfig,
}

impl Converter {
    /// Converter over the process-wide capability registry
    pub fn new(config: &Config) -> Self {
        Self::with_capabilities(config, *Capabilities::resolve(config))
    }

    /// Converter over an explicit capability set
    pub fn with_capabilities(config: &Config, capabilities: Capabilities) -> Self {
        let normalizer = config
            .normalizer
            .enabled
            .then(|| Normalizer::new(config.normalizer.wrap_width));
        Self {
            capabilities,
            normalizer,
            ocr: config.ocr.clone(),
        }
    }

    /// Shared converter built from the default config locations
    pub fn global() -> &'static Converter {
        CONVERTER.get_or_init(|| {
            let config = Config::load().unwrap_or_else(|e| {
                warn!("Failed to load config, using defaults: {:#}", e);
                Config::default()
            });
            Converter::new(&config)
        })
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Classify and extract without reflowing the text
    pub async fn extract_raw(&self, path: &Path) -> ExtractionResult {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(ConvertError::NotFound(path.to_path_buf()));
        }

        let meta = FileMeta::from_path(path);
        debug!(
            "Classified {} as {} (ext '{}', mime '{}')",
            path.display(),
            meta.format,
            meta.extension,
            meta.mime
        );

        match meta.format {
            SupportedFormat::Doc => return Err(ConvertError::LegacyDoc),
            SupportedFormat::Unknown => {
                return Err(ConvertError::UnknownType {
                    ext: meta.extension,
                    mime: meta.mime,
                })
            }
            _ => {}
        }

        let source = FileFactory::create_from_meta(&meta, &self.ocr).ok_or_else(|| {
            ConvertError::UnknownType {
                ext: meta.extension.clone(),
                mime: meta.mime.clone(),
            }
        })?;

        source.to_text(&self.capabilities).await
    }

    /// Classify, extract and reflow one file
    pub async fn convert(&self, path: &Path) -> ExtractionResult {
        let raw = self.extract_raw(path).await.map_err(|e| {
            debug!("Conversion of {} failed: {:?}", path.display(), e.kind());
            e
        })?;

        Ok(match &self.normalizer {
            Some(normalizer) => {
                debug!("Reflowing {} to {} columns", path.display(), normalizer.width());
                normalizer.normalize(&raw)
            }
            None => raw,
        })
    }

    /// String form of [`Converter::convert`]: the text, or the diagnostic
    /// message of the failure. Never fails.
    pub async fn convert_to_text(&self, path: &Path) -> String {
        match self.convert(path).await {
            Ok(text) => text,
            Err(e) => e.to_string(),
        }
    }
}

/// Convert one file with the shared converter
pub async fn convert_to_text(path: impl AsRef<Path>) -> String {
    Converter::global().convert_to_text(path.as_ref()).await
}
