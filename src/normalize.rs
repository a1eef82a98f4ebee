//! Whitespace reflow applied to every extractor's output.
//!
//! Tabs become spaces, space runs collapse, blank-line runs collapse to a
//! single blank line, and each paragraph is rewrapped to a fixed width.
//! Wrapping only ever inserts line breaks; breaks already present in a
//! paragraph are kept. The pass is idempotent.

use crate::constants::DEFAULT_WRAP_WIDTH;
use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));
static BLANK_LINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Paragraph reflow with a fixed column width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    width: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_WRAP_WIDTH)
    }
}

impl Normalizer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() || is_binary_like(raw) {
            return raw.to_string();
        }

        let text = raw.replace('\t', " ");
        let text = SPACE_RUNS.replace_all(&text, " ");
        let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");

        text.split("\n\n")
            .map(|paragraph| self.wrap_paragraph(paragraph.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn wrap_paragraph(&self, paragraph: &str) -> String {
        paragraph
            .split('\n')
            .map(|line| self.wrap_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Greedy fill of one physical line. A word wider than the line is left
    /// whole on a line of its own.
    fn wrap_line(&self, line: &str) -> String {
        if line.chars().count() <= self.width {
            return line.to_string();
        }

        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0;

        for (i, word) in line.split(' ').enumerate() {
            let word_width = word.chars().count();
            if i == 0 {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width <= self.width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
            } else if word.is_empty() {
                // space at the break point
                continue;
            } else {
                if current.trim().is_empty() {
                    current.clear();
                } else {
                    lines.push(std::mem::take(&mut current));
                }
                current.push_str(word);
                current_width = word_width;
            }
        }

        if !current.trim().is_empty() {
            lines.push(current);
        }

        lines.join("\n")
    }
}

/// Normalize with the default 80-column width
pub fn normalize(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}

/// Text carrying NUL bytes is a binary payload, not prose
fn is_binary_like(raw: &str) -> bool {
    raw.contains('\0')
}
