//! Filename sanitizing
//!
//! Uploaded filenames may contain anything: path separators, control
//! characters, shell metacharacters. The sanitized form is what gets used
//! for scratch files, remote paths and thumbnail names; the original is
//! kept verbatim in the metadata record for display.

use chrono::Local;

/// Characters that survive sanitizing: CJK ideographs, ASCII letters and
/// digits, whitespace, period, underscore, hyphen.
fn is_allowed_char(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fa5}')
        || c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '.' | '_' | '-')
}

/// Replace every disallowed character with an underscore and trim
/// surrounding whitespace. An empty result falls back to a compact local
/// timestamp so the pipeline always has a usable name.
///
/// No uniqueness guarantee; two uploads of `a.png` on the same day land on
/// the same remote path and the second overwrites the first.
pub fn sanitize_filename(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if is_allowed_char(c) { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        Local::now().format("%Y%m%d%H%M%S").to_string()
    } else {
        cleaned.to_string()
    }
}
