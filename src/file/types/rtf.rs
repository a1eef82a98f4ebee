use crate::capability::{Capabilities, Capability};
use crate::error::ExtractionResult;
use crate::file::r#trait::{run_blocking, TextSource};
use crate::models::SupportedFormat;
use crate::utils::read_text_lossy;
use anyhow::{bail, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\\([a-z]{1,32})(-?\d{1,10})?[ ]?|\\'([0-9a-f]{2})|\\([^a-z])|([{}])|[\r\n]+|(.)")
        .expect("valid regex")
});

/// Control words whose group holds no document text
const DESTINATIONS: &[&str] = &[
    "aftncn", "aftnsep", "aftnsepc", "annotation", "atnauthor", "atndate", "atnicn", "atnid",
    "atnparent", "atnref", "atntime", "atrfend", "atrfstart", "author", "background",
    "bkmkend", "bkmkstart", "blipuid", "buptim", "category", "colorschememapping",
    "colortbl", "comment", "company", "creatim", "datafield", "datastore", "defchp", "defpap",
    "do", "doccomm", "docvar", "dptxbxtext", "ebcend", "ebcstart", "factoidname", "falt",
    "fchars", "ffdeftext", "ffentrymcr", "ffexitmcr", "ffformat", "ffhelptext", "ffl",
    "ffname", "ffstattext", "file", "filetbl", "fldinst", "fldtype", "fname",
    "fontemb", "fontfile", "fonttbl", "footer", "footerf", "footerl", "footerr", "footnote",
    "formfield", "ftncn", "ftnsep", "ftnsepc", "g", "generator", "gridtbl", "header",
    "headerf", "headerl", "headerr", "hl", "hlfr", "hlinkbase", "hlloc", "hlsrc", "hsv",
    "htmltag", "info", "keycode", "keywords", "latentstyles", "lchars", "levelnumbers",
    "leveltext", "lfolevel", "linkval", "list", "listlevel", "listname", "listoverride",
    "listoverridetable", "listpicture", "liststylename", "listtable", "listtext",
    "lsdlockedexcept", "macc", "maccPr", "mailmerge", "maln", "malnScr", "manager", "margPr",
    "mbar", "mbarPr", "mbaseJc", "mbegChr", "mborderBox", "mborderBoxPr", "mbox", "mboxPr",
    "mchr", "mcount", "mctrlPr", "md", "mdeg", "mdegHide", "mden", "mdiff", "mdPr", "me",
    "mendChr", "meqArr", "meqArrPr", "mf", "mfName", "mfPr", "mfunc", "mfuncPr", "mgroupChr",
    "mgroupChrPr", "mgrow", "mhideBot", "mhideLeft", "mhideRight", "mhideTop", "mhtmltag",
    "mlim", "mlimloc", "mlimlow", "mlimlowPr", "mlimupp", "mlimuppPr", "mm", "mmaddfieldname",
    "mmath", "mmathPict", "mmathPr", "mmaxdist", "mmc", "mmcJc", "mmconnectstr",
    "mmconnectstrdata", "mmcPr", "mmcs", "mmdatasource", "mmheadersource", "mmmailsubject",
    "mmodso", "mmodsofilter", "mmodsofldmpdata", "mmodsomappedname", "mmodsoname",
    "mmodsorecipdata", "mmodsosort", "mmodsosrc", "mmodsotable", "mmodsoudl",
    "mmodsoudldata", "mmodsouniquetag", "mmPr", "mmquery", "mmr", "mnary", "mnaryPr",
    "mnoBreak", "mnum", "mobjDist", "moMath", "moMathPara", "moMathParaPr", "mopEmu",
    "mphant", "mphantPr", "mplcHide", "mpos", "mr", "mrad", "mradPr", "mrPr", "msepChr",
    "mshow", "mshp", "msPre", "msPrePr", "msSub", "msSubPr", "msSubSup", "msSubSupPr",
    "msSup", "msSupPr", "mstrikeBLTR", "mstrikeH", "mstrikeTLBR", "mstrikeV", "msub",
    "msubHide", "msup", "msupHide", "mtransp", "mtype", "mvertJc", "mvfmf", "mvfml", "mvtof",
    "mvtol", "mzeroAsc", "mzeroDesc", "mzeroWid", "nesttableprops", "nextfile",
    "nonesttables", "objalias", "objclass", "objdata", "object", "objname", "objsect",
    "objtime", "oldcprops", "oldpprops", "oldsprops", "oldtprops", "oleclsid", "operator",
    "panose", "password", "passwordhash", "pgp", "pgptbl", "picprop", "pict", "pn",
    "pnseclvl", "pntext", "pntxta", "pntxtb", "printim", "private", "propname", "protend",
    "protstart", "protusertbl", "pxe", "result", "revtbl", "revtim", "rsidtbl", "rxe", "shp",
    "shpgrp", "shpinst", "shppict", "shprslt", "shptxt", "sn", "sp", "staticval",
    "stylesheet", "subject", "sv", "svb", "tc", "template", "themedata", "title", "txe", "ud",
    "upr", "userprops", "wgrffmtfilter", "windowcaption", "writereservation",
    "writereservhash", "xe", "xform", "xmlattrname", "xmlattrvalue", "xmlclose", "xmlname",
    "xmlnstbl", "xmlopen",
];

/// Control words that stand for a character
fn special_char(word: &str) -> Option<&'static str> {
    let text = match word {
        "par" | "line" | "row" => "\n",
        "sect" | "page" => "\n\n",
        "tab" => "\t",
        "cell" | "nestcell" => "|",
        "emdash" => "\u{2014}",
        "endash" => "\u{2013}",
        "emspace" => "\u{2003}",
        "enspace" => "\u{2002}",
        "qmspace" => "\u{2005}",
        "bullet" => "\u{2022}",
        "lquote" => "\u{2018}",
        "rquote" => "\u{2019}",
        "ldblquote" => "\u{201c}",
        "rdblquote" => "\u{201d}",
        _ => return None,
    };
    Some(text)
}

/// Windows-1252 code points for bytes 0x80..=0x9F; the rest map to Latin-1
const CP1252_HIGH: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9f => CP1252_HIGH[(byte - 0x80) as usize],
        _ => char::from(byte),
    }
}

/// RTF (.rtf) file handler. Drops formatting, tables of fonts and colors,
/// pictures and other non-text destinations.
pub struct RtfFile {
    path: PathBuf,
}

impl RtfFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[derive(Clone, Copy)]
struct GroupState {
    /// Characters to skip after a `\uN` escape
    uc_skip: usize,
    ignorable: bool,
}

/// Strip RTF control words and groups down to the document text
pub fn rtf_to_text(source: &str) -> Result<String> {
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState {
        uc_skip: 1,
        ignorable: false,
    };
    let mut cur_skip = 0usize;
    let mut pending_high: Option<u16> = None;
    let mut out = String::with_capacity(source.len() / 2);

    for caps in TOKENS.captures_iter(source) {
        let word = caps.get(1).map(|m| m.as_str());
        let arg = caps.get(2).map(|m| m.as_str());
        let hex = caps.get(3).map(|m| m.as_str());
        let symbol = caps.get(4).map(|m| m.as_str());
        let brace = caps.get(5).map(|m| m.as_str());
        let literal = caps.get(6).map(|m| m.as_str());

        if let Some(brace) = brace {
            cur_skip = 0;
            if brace == "{" {
                stack.push(state);
            } else {
                match stack.pop() {
                    Some(outer) => state = outer,
                    None => bail!(
                        "unbalanced closing brace at byte {}",
                        caps.get(0).map_or(0, |m| m.start())
                    ),
                }
            }
        } else if let Some(symbol) = symbol {
            cur_skip = 0;
            match symbol {
                "*" => state.ignorable = true,
                _ if state.ignorable => {}
                "~" => out.push('\u{a0}'),
                "-" => out.push('\u{ad}'),
                "_" => out.push('\u{2011}'),
                "\n" | "\r" => out.push('\n'),
                "{" | "}" | "\\" => out.push_str(symbol),
                _ => {}
            }
        } else if let Some(word) = word {
            cur_skip = 0;
            if DESTINATIONS.contains(&word) {
                state.ignorable = true;
            } else if !state.ignorable {
                if let Some(text) = special_char(word) {
                    out.push_str(text);
                } else if word == "uc" {
                    state.uc_skip = arg.and_then(|a| a.parse().ok()).unwrap_or(1);
                } else if word == "u" {
                    if let Some(code) = arg.and_then(|a| a.parse::<i32>().ok()) {
                        let unit = (if code < 0 { code + 0x10000 } else { code }) as u16;
                        push_utf16(&mut out, &mut pending_high, unit);
                    }
                    cur_skip = state.uc_skip;
                }
            }
        } else if let Some(hex) = hex {
            if cur_skip > 0 {
                cur_skip -= 1;
            } else if !state.ignorable {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(cp1252_char(byte));
                }
            }
        } else if let Some(literal) = literal {
            if cur_skip > 0 {
                cur_skip -= 1;
            } else if !state.ignorable {
                out.push_str(literal);
            }
        }
    }

    Ok(out)
}

/// Append one UTF-16 unit, pairing surrogates across consecutive `\u` escapes
fn push_utf16(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    match (pending_high.take(), unit) {
        (None, 0xD800..=0xDBFF) => *pending_high = Some(unit),
        (Some(high), 0xDC00..=0xDFFF) => {
            let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        (Some(_), _) | (None, 0xDC00..=0xDFFF) => out.push(char::REPLACEMENT_CHARACTER),
        (None, _) => out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)),
    }
}

#[async_trait]
impl TextSource for RtfFile {
    async fn to_text_impl(&self, _caps: &Capabilities) -> ExtractionResult {
        let path = self.path.clone();
        run_blocking("RTF text extraction failed", move || {
            let source = read_text_lossy(&path)?;
            rtf_to_text(&source)
        })
        .await
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Rtf)
    }

    fn format(&self) -> SupportedFormat {
        SupportedFormat::Rtf
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
