//! Plain-text normalization of CMS-delivered HTML fragments.

use std::cell::RefCell;
use std::sync::OnceLock;

use lol_html::html_content::TextType;
use lol_html::{RewriteStrSettings, doc_text, rewrite_str};
use regex::Regex;

/// Internal marker for `<br>` positions. Inserted before markup stripping so
/// line breaks survive the pass that removes every tag. Private-use code
/// points keep the marker out of any real document text.
const BREAK_TOKEN: &str = "\u{E000}br\u{E000}";

fn line_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\b[^>]*>").expect("valid regex"))
}

fn whitespace_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn break_to_token(input: &str) -> String {
    line_break_regex().replace_all(input, BREAK_TOKEN).to_string()
}

/// `lol_html::rewrite_str` is less permissive than browser parsing: a "stray" `<`
/// that does not start a valid tag (e.g. `"a < b"`) can fail the whole rewrite.
/// Browsers treat those `<` tokens as text, so pre-escape them to `&lt;` before
/// parsing; entity decoding restores them afterwards.
fn escape_stray_lt(input: &str) -> std::borrow::Cow<'_, str> {
    let bytes = input.as_bytes();
    let mut pos = 0usize;
    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            let next = bytes.get(pos + 1).copied().unwrap_or(b' ');
            let tag_start = next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?');
            if !tag_start {
                break;
            }
        }
        pos += 1;
    }
    if pos >= bytes.len() {
        return std::borrow::Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    let mut last = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            let next = bytes.get(i + 1).copied().unwrap_or(b' ');
            let tag_start = next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?');
            if !tag_start {
                out.push_str(&input[last..i]);
                out.push_str("&lt;");
                i += 1;
                last = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&input[last..]);
    std::borrow::Cow::Owned(out)
}

/// Strips markup and returns the document text with entities still encoded.
/// Raw-text payloads (`<script>`, `<style>`) are not document text and are
/// skipped. On rewriter error the input is returned as-is.
fn extract_text(html: &str) -> String {
    let html = escape_stray_lt(html);
    let text = RefCell::new(String::new());
    let rewritten = rewrite_str(
        html.as_ref(),
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                if matches!(chunk.text_type(), TextType::Data | TextType::RCData) {
                    text.borrow_mut().push_str(chunk.as_str());
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    match rewritten {
        Ok(_) => text.into_inner(),
        Err(_) => html.into_owned(),
    }
}

/// Converts an HTML fragment into display-ready lines.
///
/// Every `<br>` variant becomes a line break, all other markup is stripped,
/// HTML entities are decoded, and each line is trimmed. Empty lines are
/// dropped, so consecutive breaks collapse. Whitespace-only input yields no
/// lines. Never fails: unparseable input degrades to being treated as text.
pub fn normalize_lines(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let marked = break_to_token(html);
    let text = if marked.contains('<') {
        extract_text(&marked)
    } else {
        marked
    };
    // Decode per segment, after the split: encoded text can never fabricate
    // or destroy a break token.
    text.split(BREAK_TOKEN)
        .map(|segment| htmlize::unescape(segment))
        .map(|segment| segment.trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Single-line variant for titles: markup stripped, entities decoded, any
/// whitespace run (line breaks included) collapsed to one space.
pub fn plain_text(html: &str) -> String {
    let joined = normalize_lines(html).join(" ");
    whitespace_run_regex().replace_all(&joined, " ").to_string()
}
