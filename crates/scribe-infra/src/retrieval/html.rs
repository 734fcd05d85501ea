//! Lightweight HTML metadata and text extraction.
//!
//! Regex based: pages are only mined for a title, a preview image, a favicon
//! and their readable text, none of which needs a full DOM.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use reqwest::Url;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));
static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));
static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid link regex"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).expect("valid attribute regex")
});
static HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<!--.*?-->")
        .expect("valid hidden block regex")
});
static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr|section|article|header|footer|pre|blockquote)>")
        .expect("valid block regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f\v]+").expect("valid space regex"));
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]+);").expect("valid entity regex"));
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n[\s\n]*").expect("valid newline regex"));

/// Lower-cased attribute name -> value, entities decoded.
fn attributes(tag: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
            Some((name, decode_entities(value.as_str())))
        })
        .collect()
}

/// Decode named, decimal and hex character references in one pass.
///
/// Unknown names and invalid code points are left as written. Non-breaking
/// spaces become plain spaces.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity.strip_prefix('#') {
                Some(number) => {
                    let code = match number.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => number.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(|c| if c == '\u{a0}' { ' ' } else { c })
                }
                None => match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                },
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Contents of `<title>`, trimmed; `None` when absent or blank.
pub fn page_title(html: &str) -> Option<String> {
    let raw = TITLE.captures(html)?.get(1)?.as_str();
    let title = INLINE_SPACE.replace_all(&decode_entities(raw), " ").trim().replace('\n', " ");
    (!title.is_empty()).then_some(title)
}

/// The `content` of the first `<meta>` whose `attr` equals `value`.
fn meta_content(html: &str, attr: &str, value: &str) -> Option<String> {
    META_TAG.find_iter(html).find_map(|tag| {
        let attrs = attributes(tag.as_str());
        let matches = attrs
            .get(attr)
            .is_some_and(|v| v.eq_ignore_ascii_case(value));
        attrs
            .get("content")
            .filter(|content| matches && !content.trim().is_empty())
            .map(|content| content.trim().to_string())
    })
}

/// `og:image`, falling back to `twitter:image`.
pub fn preview_image(html: &str) -> Option<String> {
    meta_content(html, "property", "og:image").or_else(|| meta_content(html, "name", "twitter:image"))
}

/// First `<link rel="icon">` or `rel="shortcut icon"`, resolved against `base`.
pub fn favicon(html: &str, base: &Url) -> Option<String> {
    LINK_TAG.find_iter(html).find_map(|tag| {
        let attrs = attributes(tag.as_str());
        let rel = attrs.get("rel")?.trim().to_ascii_lowercase();
        if rel != "icon" && rel != "shortcut icon" {
            return None;
        }
        let href = attrs.get("href")?.trim();
        if href.is_empty() {
            return None;
        }
        base.join(href).ok().map(String::from)
    })
}

/// Readable text of a page: no scripts, styles or markup, whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    let text = HIDDEN_BLOCK.replace_all(html, " ");
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = INLINE_SPACE.replace_all(&text, " ");
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    BLANK_LINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}
