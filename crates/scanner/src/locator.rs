//! CSS locator assembly from harvested path segments.

use std::fmt::Write as _;

use crate::harvest::PathSegment;

/// Build a locator for a candidate. An element with its own id gets the
/// shortest form, `#id`. Otherwise the ancestor path is rendered as a
/// `>`-combinator chain, rooted at the nearest id-bearing ancestor or at
/// `body`. A detached element with no path falls back to its bare tag name.
#[must_use]
pub fn build_locator(own_id: Option<&str>, tag: &str, path: &[PathSegment]) -> String {
    if let Some(id) = own_id.filter(|id| !id.is_empty()) {
        return format!("#{}", css_escape(id));
    }

    let Some(first) = path.first() else {
        return tag.to_string();
    };

    let mut parts = Vec::with_capacity(path.len() + 1);
    if first.id.is_none() {
        parts.push("body".to_string());
    }
    for segment in path {
        parts.push(render_segment(segment));
    }
    parts.join(" > ")
}

fn render_segment(segment: &PathSegment) -> String {
    if let Some(id) = segment.id.as_deref().filter(|id| !id.is_empty()) {
        return format!("#{}", css_escape(id));
    }
    match segment.nth {
        Some(n) => format!("{}:nth-of-type({n})", segment.tag),
        None => segment.tag.clone(),
    }
}

/// Escape an identifier for use in a CSS selector, following the `CSS.escape`
/// algorithm: alphanumerics, `-`, `_`, and non-ASCII pass through; a leading
/// digit becomes a hex escape; everything else gets a backslash.
#[must_use]
pub fn css_escape(ident: &str) -> String {
    let char_count = ident.chars().count();
    let starts_with_dash = ident.starts_with('-');
    let mut out = String::with_capacity(ident.len());

    for (i, ch) in ident.chars().enumerate() {
        let code = ch as u32;
        if ch == '\0' {
            out.push('\u{FFFD}');
        } else if code < 0x20 || code == 0x7f {
            let _ = write!(out, "\\{code:x} ");
        } else if ch.is_ascii_digit() && (i == 0 || (i == 1 && starts_with_dash)) {
            let _ = write!(out, "\\{code:x} ");
        } else if ch == '-' && char_count == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}
