//! `<title>` extraction for pages being bookmarked.

use std::sync::OnceLock;

use regex::Regex;

/// Most bytes of a page read while looking for its title
pub const TITLE_SCAN_LIMIT: usize = 64 * 1024;

const TITLE_END: &[u8] = b"</title";
/// Length of the `</title` marker
pub const TITLE_END_LEN: usize = TITLE_END.len();

static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

/// Text of the first `<title>` element, or `None` if the page has no
/// non-empty title.
pub fn extract_title(html: &str) -> Option<String> {
    let title_re = TITLE_RE.get_or_init(|| {
        Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("valid title regex")
    });
    let whitespace_re =
        WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));

    let raw = title_re.captures(html)?.get(1)?.as_str();
    let title = decode_entities(whitespace_re.replace_all(raw, " ").trim());

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Whether a closing `</title` tag appears in `page`, ignoring case.
pub fn contains_title_end(page: &[u8]) -> bool {
    page.windows(TITLE_END.len())
        .any(|window| window.eq_ignore_ascii_case(TITLE_END))
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;"
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
