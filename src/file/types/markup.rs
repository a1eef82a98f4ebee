//! Visible-text extraction shared by the HTML, XML and Pages extractors.
//!
//! The strict path walks a `quick-xml` event stream; it fails on input that
//! is not well formed. The permissive path strips anything tag-shaped with
//! regular expressions and never fails.

use crate::constants::HTML_INVISIBLE_ELEMENTS;
use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use tracing::warn;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

static HIDDEN_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<template\b[^>]*>.*?</template\s*>",
    )
    .expect("valid regex")
});
static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static CDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>").expect("valid regex"));
static TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)</?[A-Za-z](?:[^<>"']|"[^"]*"|'[^']*')*>|<![^>]*>|<\?[^>]*>"#)
        .expect("valid regex")
});
static ENTITIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Html,
    Xml,
}

/// Visible text of an HTML document
pub fn html_to_text(source: &str, strict: bool) -> String {
    to_text(source, Dialect::Html, strict)
}

/// Character data of an XML document
pub fn xml_to_text(source: &str, strict: bool) -> String {
    to_text(source, Dialect::Xml, strict)
}

fn to_text(source: &str, dialect: Dialect, strict: bool) -> String {
    if strict {
        match strict_text(source, dialect) {
            Ok(text) => return text,
            Err(e) => warn!("Strict {:?} parse failed, using permissive parser: {}", dialect, e),
        }
    }
    permissive_text(source, dialect)
}

/// Walk the document as an event stream, collecting text nodes
pub fn strict_text(source: &str, dialect: Dialect) -> Result<String> {
    let source = match dialect {
        Dialect::Html => HIDDEN_BLOCKS.replace_all(source, ""),
        Dialect::Xml => source.into(),
    };

    let mut reader = Reader::from_str(&source);
    // void elements such as <br> are never closed in HTML
    reader.check_end_names(dialect == Dialect::Xml);

    let mut text = String::new();
    let mut hidden: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                check_tag(&e, reader.buffer_position())?;
                if dialect == Dialect::Html {
                    let name = e.local_name().as_ref().to_ascii_lowercase();
                    if hidden.is_none() && is_invisible(&name) {
                        hidden = Some(name);
                    }
                }
            }
            Ok(Event::Empty(e)) => check_tag(&e, reader.buffer_position())?,
            Ok(Event::End(e)) => {
                check_tag(&e, reader.buffer_position())?;
                if dialect == Dialect::Html {
                    let name = e.local_name().as_ref().to_ascii_lowercase();
                    if hidden.as_deref() == Some(name.as_slice()) {
                        hidden = None;
                    }
                }
            }
            Ok(Event::Text(e)) if hidden.is_none() => match dialect {
                Dialect::Html => {
                    text.push_str(&decode_entities(&String::from_utf8_lossy(&e.into_inner())))
                }
                Dialect::Xml => text.push_str(&e.unescape()?),
            },
            Ok(Event::CData(e)) if dialect == Dialect::Xml => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(text)
}

/// A tag opens with a name and holds no `<`; anything else is text such as
/// `1 < 2` that the reader took for markup.
fn check_tag(raw: &[u8], position: usize) -> Result<()> {
    let named = raw
        .first()
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'_' | b':') || *b >= 0x80);
    if !named || raw.contains(&b'<') {
        bail!(
            "stray '<' before position {}: <{}",
            position,
            String::from_utf8_lossy(raw)
        );
    }
    Ok(())
}

/// Strip tag-shaped spans and decode entities. Never fails.
pub fn permissive_text(source: &str, dialect: Dialect) -> String {
    let mut text = COMMENTS.replace_all(source, "").into_owned();
    if dialect == Dialect::Html {
        text = HIDDEN_BLOCKS.replace_all(&text, "").into_owned();
    }

    // CDATA content is literal; only the text around it is tag-stripped
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for section in CDATA.find_iter(&text) {
        out.push_str(&strip_tags(&text[last..section.start()]));
        if dialect == Dialect::Xml {
            let raw = section.as_str();
            out.push_str(&raw[CDATA_OPEN.len()..raw.len() - CDATA_CLOSE.len()]);
        }
        last = section.end();
    }
    out.push_str(&strip_tags(&text[last..]));
    out
}

fn strip_tags(fragment: &str) -> String {
    decode_entities(&TAGS.replace_all(fragment, ""))
}

/// Decode numeric and common named character references; unknown ones are kept
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITIES
        .replace_all(text, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "bull" => '\u{2022}',
        "middot" => '\u{b7}',
        "euro" => '\u{20ac}',
        "pound" => '\u{a3}',
        "yen" => '\u{a5}',
        "cent" => '\u{a2}',
        "sect" => '\u{a7}',
        "deg" => '\u{b0}',
        "times" => '\u{d7}',
        "divide" => '\u{f7}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        _ => return None,
    };
    Some(c)
}

fn is_invisible(name: &[u8]) -> bool {
    HTML_INVISIBLE_ELEMENTS
        .iter()
        .any(|hidden| hidden.as_bytes() == name)
}
