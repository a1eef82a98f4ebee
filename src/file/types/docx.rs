use crate::capability::{Capabilities, Capability};
use crate::constants::DOCX_DOCUMENT_ENTRY;
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::file::types::archive;
use crate::models::SupportedFormat;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::{Path, PathBuf};

/// Word (.docx) file handler. Flat text only: headers, body, then footers.
pub struct DocxFile {
    path: PathBuf,
}

impl DocxFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn is_part(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|index| index.chars().all(|c| c.is_ascii_digit()))
}

fn extract_docx_text(path: &Path) -> Result<String> {
    let mut archive = archive::open(path)?;
    let names = archive::entry_names(&archive);

    let headers = names.iter().filter(|n| is_part(n, "word/header"));
    let footers = names.iter().filter(|n| is_part(n, "word/footer"));

    let mut text = String::new();
    for header in headers {
        text.push_str(&part_text(&archive::read_entry(&mut archive, header)?)?);
    }
    text.push_str(&part_text(&archive::read_entry(&mut archive, DOCX_DOCUMENT_ENTRY)?)?);
    for footer in footers {
        text.push_str(&part_text(&archive::read_entry(&mut archive, footer)?)?);
    }

    Ok(text.trim().to_string())
}

/// Text of one WordprocessingML part. Paragraphs open with a blank line,
/// tabs inside runs become tabs, breaks become newlines.
fn part_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text = false;
    let mut run_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:r" => run_depth += 1,
                b"w:p" => text.push_str("\n\n"),
                b"w:tab" if run_depth > 0 => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => text.push_str("\n\n"),
                b"w:tab" if run_depth > 0 => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => text.push_str(&e.unescape()?),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}

#[async_trait]
impl TextSource for DocxFile {
    async fn to_text_impl(&self, _caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        run_blocking("DOCX text extraction failed", move || extract_docx_text(&path)).await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Docx)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Docx
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
