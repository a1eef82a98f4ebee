use crate::capability::{Capabilities, Capability};
use crate::config::OcrConfig;
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::models::SupportedFormat;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Raster image handler. Text comes from the external OCR engine run on
/// the image as decoded; no deskewing or thresholding is applied.
pub struct ImageFile {
    path: PathBuf,
    ocr: OcrConfig,
}

impl ImageFile {
    pub fn new(path: PathBuf, ocr: OcrConfig) -> Self {
        Self { path, ocr }
    }
}

fn ocr_image(path: &Path, ocr: &OcrConfig) -> Result<String> {
    let img = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image: {}", path.display()))?
        .decode()
        .with_context(|| format!("Cannot identify image file: {}", path.display()))?;

    debug!(
        "Decoded {} ({}x{}), running {}",
        path.display(),
        img.width(),
        img.height(),
        ocr.command
    );

    // the engine reads a normalized PNG regardless of the source encoding
    let png = tempfile::Builder::new()
        .prefix("ocr-")
        .suffix(".png")
        .tempfile()
        .context("Failed to create temporary image file")?
        .into_temp_path();
    img.save_with_format(&png, ImageFormat::Png)
        .context("Failed to write temporary image file")?;

    let output = Command::new(&ocr.command)
        .arg(png.as_os_str())
        .arg("stdout")
        .arg("-l")
        .arg(&ocr.language)
        .output()
        .with_context(|| format!("Failed to run {}", ocr.command))?;

    if let Err(e) = png.close() {
        warn!("Failed to remove temporary image file: {}", e);
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} exited with {}: {}", ocr.command, output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl TextSource for ImageFile {
    async fn to_text_impl(&self, _caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        let ocr = self.ocr.clone();
        run_blocking("Image OCR failed", move || ocr_image(&path, &ocr)).await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Ocr)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Image
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::FailureKind;
    use tempfile::Builder;

    #[tokio::test]
    async fn test_image_missing_ocr_backend() {
        let image_file = ImageFile::new(PathBuf::from("/test/scan.png"), OcrConfig::default());
        let err = image_file.to_text(&Capabilities::none()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MissingCapability);
        assert_eq!(err.to_string(), "[ERROR] ocr not installed or failed to import.");
    }

    #[tokio::test]
    async fn test_image_undecodable_fails() {
        let temp_file = Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(temp_file.path(), "not an image").unwrap();

        let image_file = ImageFile::new(temp_file.path().to_path_buf(), OcrConfig::default());
        let err = image_file.to_text(&Capabilities::all()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ExtractionFailure);
        assert!(err.to_string().starts_with("[ERROR] Image OCR failed: "));
    }

    #[tokio::test]
    async fn test_image_ocr_engine_missing_fails() {
        let temp_file = Builder::new().suffix(".png").tempfile().unwrap();
        image::RgbImage::new(16, 16).save(temp_file.path()).unwrap();

        let ocr = OcrConfig {
            command: "doctext-no-such-ocr-engine".to_string(),
            ..OcrConfig::default()
        };
        let image_file = ImageFile::new(temp_file.path().to_path_buf(), ocr);
        let err = image_file.to_text(&Capabilities::all()).await.unwrap_err();
        assert!(err.to_string().contains("doctext-no-such-ocr-engine"));
    }

    #[tokio::test]
    async fn test_image_blank_with_engine() {
        let config = Config::default();
        if !Capabilities::probe(&config).ocr {
            return;
        }

        let temp_file = Builder::new().suffix(".png").tempfile().unwrap();
        image::RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255]))
            .save(temp_file.path())
            .unwrap();

        let image_file = ImageFile::new(temp_file.path().to_path_buf(), config.ocr);
        let text = image_file.to_text(&Capabilities::all()).await.unwrap();
        assert!(text.trim().is_empty());
    }
}
