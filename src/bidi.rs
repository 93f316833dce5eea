//! Right-to-left repair for translated subtitles.
//!
//! Players guess paragraph direction from the first strong character, so a
//! Persian caption that opens with a Latin word or a number is laid out
//! left-to-right. Every caption line is therefore cleaned of existing
//! directional controls and wrapped in an RLE ... PDF embedding. Index,
//! timecode and blank lines are left untouched.

use crate::subtitle::{is_index_line, is_timecode_line};

/// RIGHT-TO-LEFT EMBEDDING
pub const RLE: char = '\u{202B}';
/// POP DIRECTIONAL FORMATTING
pub const PDF: char = '\u{202C}';

/// Marks, embeddings, overrides and isolates
pub fn is_bidi_control(c: char) -> bool {
    matches!(
        c,
        // ALM, LRM, RLM
        '\u{061C}' | '\u{200E}' | '\u{200F}'
        // LRE, RLE, PDF, LRO, RLO
        | '\u{202A}'..='\u{202E}'
        // LRI, RLI, FSI, PDI
        | '\u{2066}'..='\u{2069}'
    )
}

/// Index, timecode or blank line
pub fn is_structural(line: &str) -> bool {
    line.trim().is_empty() || is_index_line(line) || is_timecode_line(line)
}

pub fn strip_bidi_controls(text: &str) -> String {
    text.chars().filter(|c| !is_bidi_control(*c)).collect()
}

/// Normalize a single line. Structural lines come back unchanged.
pub fn normalize_line(line: &str) -> String {
    if is_structural(line) {
        return line.to_string();
    }

    let content = strip_bidi_controls(line.trim());
    let content = content.trim();

    let mut fixed = String::with_capacity(content.len() + RLE.len_utf8() + PDF.len_utf8());
    fixed.push(RLE);
    fixed.push_str(content);
    fixed.push(PDF);
    fixed
}

/// Normalize every content line of `text`, keeping line order and count
pub fn normalize(text: &str) -> String {
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}
