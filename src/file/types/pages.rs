use crate::capability::{Capabilities, Capability};
use crate::constants::{PAGES_INDEX_ENTRY, PAGES_PREVIEW_ENTRY};
use crate::error::{ConvertError, ExtractionResult};
use crate::file::r#trait::TextSource;
use crate::file::types::archive;
use crate::file::types::markup::xml_to_text;
use crate::file::types::pdf::PdfFile;
use crate::models::SupportedFormat;
use crate::utils::decode_utf8_ignoring_invalid;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};
use zip::ZipArchive;

const CONTEXT: &str = ".pages text extraction failed";

/// Apple Pages (.pages) file handler. Best effort: reads the package's
/// `index.xml` when present, otherwise the embedded QuickLook preview PDF.
pub struct PagesFile {
    path: PathBuf,
    /// Where the preview PDF is copied; the system temp dir when unset
    scratch_dir: Option<PathBuf>,
}

impl PagesFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            scratch_dir: None,
        }
    }

    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = Some(dir);
        self
    }
}

/// What the package offers to read text from
enum PagesBody {
    Index(String),
    /// Preview PDF copied out to a temp file, removed when dropped
    Preview(TempPath),
    Missing,
}

fn locate_body(
    path: &Path,
    scratch_dir: Option<&Path>,
) -> std::result::Result<PagesBody, ConvertError> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))
        .map_err(|e| ConvertError::failed(CONTEXT, format!("{e:#}")))?;

    let mut archive = ZipArchive::new(file).map_err(|e| {
        debug!("Not a zip archive: {}: {}", path.display(), e);
        ConvertError::Unreadable("Failed to open .pages file as a zip archive.".to_string())
    })?;

    read_body(&mut archive, scratch_dir).map_err(|e| ConvertError::failed(CONTEXT, format!("{e:#}")))
}

fn read_body(archive: &mut ZipArchive<File>, scratch_dir: Option<&Path>) -> Result<PagesBody> {
    if archive::has_entry(archive, PAGES_INDEX_ENTRY) {
        let bytes = archive::read_entry_bytes(archive, PAGES_INDEX_ENTRY)?;
        return Ok(PagesBody::Index(decode_utf8_ignoring_invalid(&bytes)));
    }

    if archive::has_entry(archive, PAGES_PREVIEW_ENTRY) {
        let bytes = archive::read_entry_bytes(archive, PAGES_PREVIEW_ENTRY)?;
        let mut builder = tempfile::Builder::new();
        builder.prefix("pages-preview-").suffix(".pdf");
        let mut temp = match scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .context("Failed to create temporary file for preview PDF")?;
        temp.write_all(&bytes)
            .and_then(|_| temp.flush())
            .context("Failed to write preview PDF")?;
        return Ok(PagesBody::Preview(temp.into_temp_path()));
    }

    Ok(PagesBody::Missing)
}

#[async_trait]
impl TextSource for PagesFile {
    async fn to_text_impl(&self, caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        let scratch_dir = self.scratch_dir.clone();
        let body = tokio::task::spawn_blocking(move || locate_body(&path, scratch_dir.as_deref()))
            .await
            .map_err(|e| ConvertError::failed(CONTEXT, e))??;

        match body {
            PagesBody::Index(xml) => {
                if !caps.ensure(Capability::Markup) {
                    return Err(ConvertError::MissingCapability(Capability::Markup));
                }
                let strict = caps.ensure(Capability::StrictMarkup);
                Ok(xml_to_text(&xml, strict).trim().to_string())
            }
            PagesBody::Preview(temp_path) => {
                debug!(
                    "Reading preview PDF of {} from {}",
                    self.path.display(),
                    temp_path.display()
                );
                let result = PdfFile::new(temp_path.to_path_buf()).to_text(caps).await;
                if let Err(e) = temp_path.close() {
                    warn!("Failed to remove temporary preview PDF: {}", e);
                }
                result
            }
            PagesBody::Missing => Err(ConvertError::Incomplete(format!(
                ".pages file does not contain '{}' or '{}'. Cannot extract text.",
                PAGES_INDEX_ENTRY, PAGES_PREVIEW_ENTRY
            ))),
        }
    }

    fn required_capability(&self) -> Option<Capability> {
        None
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Pages
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::test_support::{sample_pdf_bytes, write_zip};
    use tempfile::{tempdir, NamedTempFile};

    fn create_test_pages(entries: &[(&str, &[u8])]) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        write_zip(temp_file.path(), entries);
        temp_file
    }

    #[tokio::test]
    async fn test_pages_index_xml() {
        let temp_file = create_test_pages(&[(
            "index.xml",
            b"<sl:document><sf:p>  Draft notes  </sf:p></sl:document>".as_slice(),
        )]);

        let pages_file = PagesFile::new(temp_file.path().to_path_buf());
        let text = pages_file.to_text(&Capabilities::all()).await.unwrap();
        assert_eq!(text, "Draft notes");
        assert_eq!(pages_file.format(), SupportedFormat::Pages);
    }

    #[tokio::test]
    async fn test_pages_index_needs_markup() {
        let temp_file = create_test_pages(&[("index.xml", b"<a>x</a>".as_slice())]);

        let pages_file = PagesFile::new(temp_file.path().to_path_buf());
        let caps = Capabilities::all().with(Capability::Markup, false);
        let err = pages_file.to_text(&caps).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MissingCapability);
    }

    #[tokio::test]
    async fn test_pages_preview_pdf() {
        let pdf = sample_pdf_bytes("Hello Pages");
        let temp_file = create_test_pages(&[
            ("QuickLook/Thumbnail.jpg", b"jpeg".as_slice()),
            ("QuickLook/Preview.pdf", pdf.as_slice()),
        ]);

        let pages_file = PagesFile::new(temp_file.path().to_path_buf());
        let text = pages_file.to_text(&Capabilities::all()).await.unwrap();
        assert!(text.contains("Hello"), "unexpected text: {text:?}");
    }

    #[test]
    fn test_preview_temp_file_removed_on_drop() {
        let pdf = sample_pdf_bytes("x");
        let temp_file = create_test_pages(&[("QuickLook/Preview.pdf", pdf.as_slice())]);

        let body = locate_body(temp_file.path(), None).unwrap();
        let PagesBody::Preview(temp_path) = body else {
            panic!("expected preview body");
        };
        let copied: PathBuf = temp_path.to_path_buf();
        assert!(copied.exists());
        drop(temp_path);
        assert!(!copied.exists());
    }

    #[tokio::test]
    async fn test_preview_temp_file_removed_after_success() {
        let pdf = sample_pdf_bytes("Kept clean");
        let temp_file = create_test_pages(&[("QuickLook/Preview.pdf", pdf.as_slice())]);
        let scratch = tempdir().unwrap();

        let pages_file = PagesFile::new(temp_file.path().to_path_buf())
            .with_scratch_dir(scratch.path().to_path_buf());
        assert!(pages_file.to_text(&Capabilities::all()).await.is_ok());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_preview_temp_file_removed_after_failure() {
        let temp_file = create_test_pages(&[(
            "QuickLook/Preview.pdf",
            b"%PDF-1.4 truncated preview".as_slice(),
        )]);
        let scratch = tempdir().unwrap();

        let pages_file = PagesFile::new(temp_file.path().to_path_buf())
            .with_scratch_dir(scratch.path().to_path_buf());
        let err = pages_file.to_text(&Capabilities::all()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ExtractionFailure);
        assert!(err.to_string().starts_with("[ERROR] PDF text extraction failed: "));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_pages_without_known_entries() {
        let temp_file = create_test_pages(&[("Data/image.png", b"png".as_slice())]);

        let pages_file = PagesFile::new(temp_file.path().to_path_buf());
        let err = pages_file.to_text(&Capabilities::all()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::PartialUnderstanding);
        assert_eq!(
            err.to_string(),
            "[INFO] .pages file does not contain 'index.xml' or 'QuickLook/Preview.pdf'. Cannot extract text."
        );
    }

    #[tokio::test]
    async fn test_pages_not_a_zip() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not a zip").unwrap();

        let pages_file = PagesFile::new(temp_file.path().to_path_buf());
        let err = pages_file.to_text(&Capabilities::all()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ExtractionFailure);
        assert_eq!(
            err.to_string(),
            "[ERROR] Failed to open .pages file as a zip archive."
        );
    }
}
