use anyhow::{Context, Result};
use std::path::Path;

/// Get file extension from path, lowercased and with its leading dot.
/// Returns an empty string when the path has none.
pub fn get_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| format!(".{}", s.to_lowercase()))
        .unwrap_or_default()
}

/// Best-effort MIME type guessed from the path, empty when unknown
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .map(str::to_string)
        .unwrap_or_default()
}

/// Decode bytes as UTF-8, dropping every invalid sequence
pub fn decode_utf8_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                // valid_up_to guarantees this prefix decodes
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match err.error_len() {
                    Some(len) => rest = &after[len..],
                    None => return out,
                }
            }
        }
    }
}

/// Read a whole file as text, dropping invalid UTF-8 bytes
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_utf8_ignoring_invalid(&bytes))
}

/// Persist converted text: UTF-8, trailing whitespace trimmed, one final newline
pub fn save_text(path: &Path, text: &str) -> Result<()> {
    let mut content = text.trim_end().to_string();
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("Failed to save text to: {}", path.display()))
}
