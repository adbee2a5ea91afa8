//! Reassembly of the search service's highlight payload into display
//! snippets.
//!
//! Hit segments are matched terms and must survive whole; truncating one
//! would defeat the highlighting. Context segments are bounded so a row
//! stays scannable: anything past the cap keeps only its trailing
//! characters, which preserves proximity to the hit that follows.

use crate::models::{HighlightKind, SearchHighlight};
use crate::render::escape_html;

/// Longest run of non-hit context kept per segment, in characters.
pub const CONTEXT_CAP: usize = 80;

/// Marker prefixed to truncated context segments.
const ELLIPSIS: &str = "…";

/// Assemble one HTML snippet from a highlight entry.
///
/// Segments are concatenated in payload order: hits rendered whole inside
/// `<em>`, context clipped to its trailing [`CONTEXT_CAP`] characters.
/// Every segment is HTML-escaped before markup is applied. An entry with
/// zero segments yields an empty snippet.
pub fn render_snippet(highlight: &SearchHighlight) -> String {
    let mut snippet = String::new();
    for segment in &highlight.texts {
        match segment.kind {
            HighlightKind::Hit => {
                snippet.push_str("<em>");
                snippet.push_str(&escape_html(&segment.value));
                snippet.push_str("</em>");
            }
            HighlightKind::Text => {
                snippet.push_str(&escape_html(&clip_context(&segment.value)));
            }
        }
    }
    snippet
}

/// Keep only the trailing [`CONTEXT_CAP`] characters of an over-long
/// context run, prefixed with an ellipsis. Counted in characters, not
/// bytes, so multi-byte text never splits mid-character.
fn clip_context(text: &str) -> String {
    match text.char_indices().rev().nth(CONTEXT_CAP) {
        Some((idx, ch)) => format!("{ELLIPSIS}{}", &text[idx + ch.len_utf8()..]),
        None => text.to_string(),
    }
}
