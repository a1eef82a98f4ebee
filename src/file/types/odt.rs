use crate::capability::{Capabilities, Capability};
use crate::constants::ODT_CONTENT_ENTRY;
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::file::types::archive;
use crate::models::SupportedFormat;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::{Path, PathBuf};

const PARAGRAPH: &[u8] = b"text:p";

/// OpenDocument text (.odt) file handler. One output line per paragraph,
/// holding only the paragraph's own text nodes; spans and fields are skipped.
pub struct OdtFile {
    path: PathBuf,
}

impl OdtFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn extract_odt_text(path: &Path) -> Result<String> {
    let mut archive = archive::open(path)?;
    let content = archive::read_entry(&mut archive, ODT_CONTENT_ENTRY)?;
    Ok(paragraph_lines(&content)?.join("\n"))
}

/// Collect the direct text children of every `text:p`, in document order.
/// Nested paragraphs (in frames or notes) get their own line.
fn paragraph_lines(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    // open elements; paragraphs carry the index of their line
    let mut open: Vec<Option<usize>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == PARAGRAPH {
                    lines.push(String::new());
                    open.push(Some(lines.len() - 1));
                } else {
                    open.push(None);
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == PARAGRAPH => lines.push(String::new()),
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Text(e)) => {
                if let Some(Some(line)) = open.last() {
                    lines[*line].push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(Some(line)) = open.last() {
                    lines[*line].push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
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

    Ok(lines)
}

#[async_trait]
impl TextSource for OdtFile {
    async fn to_text_impl(&self, _caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        run_blocking("ODT text extraction failed", move || extract_odt_text(&path)).await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Odt)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Odt
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
