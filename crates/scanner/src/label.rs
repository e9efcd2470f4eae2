//! Label resolution and context formatting.

use crate::harvest::{ContextSource, RawCandidate};

/// Display labels longer than this are truncated to 47 chars plus `...`.
pub const MAX_LABEL_LEN: usize = 50;

const MAX_CONTEXT_LEN: usize = 30;

/// Resolve a candidate's label from its sources, in priority order:
/// `aria-label`, `aria-labelledby` text, first line of visible text, `title`,
/// nested image `alt`, `placeholder`, input `value`. Returns `None` when no
/// source yields a non-empty label; such candidates are dropped.
#[must_use]
pub fn resolve_label(candidate: &RawCandidate) -> Option<String> {
    let sources = [
        &candidate.aria_label,
        &candidate.labelled_by,
        &candidate.text,
        &candidate.title,
        &candidate.img_alt,
        &candidate.placeholder,
        &candidate.value,
    ];
    sources
        .into_iter()
        .filter_map(|s| s.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(|s| truncate_label(first_line(s)))
}

/// Cap a label at [`MAX_LABEL_LEN`] characters, replacing the tail with
/// `...`. Operates on chars, not bytes.
#[must_use]
pub fn truncate_label(label: &str) -> String {
    truncate_to(label, MAX_LABEL_LEN)
}

/// Render an ancestor context for use as a disambiguation prefix.
#[must_use]
pub fn format_context(context: &ContextSource) -> String {
    match context {
        ContextSource::AriaLabel(v) | ContextSource::Heading(v) => {
            truncate_to(v.trim(), MAX_CONTEXT_LEN)
        },
        ContextSource::Id(v) => id_to_words(v),
        ContextSource::Section(tag) => capitalize(tag),
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

fn truncate_to(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Turn an element id like `main-nav` or `user_menu` into `Main Nav`.
fn id_to_words(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> RawCandidate {
        RawCandidate {
            page_ref: 0,
            tag: "button".into(),
            role: None,
            aria_label: None,
            labelled_by: None,
            text: None,
            title: None,
            img_alt: None,
            placeholder: None,
            value: None,
            href: None,
            own_id: None,
            path: vec![],
            context: None,
            bounds: None,
        }
    }

    #[test]
    fn aria_label_wins_over_text() {
        let mut c = candidate();
        c.aria_label = Some("Close dialog".into());
        c.text = Some("X".into());
        assert_eq!(resolve_label(&c).unwrap(), "Close dialog");
    }

    #[test]
    fn blank_sources_fall_through() {
        let mut c = candidate();
        c.aria_label = Some("   ".into());
        c.title = Some("Settings".into());
        assert_eq!(resolve_label(&c).unwrap(), "Settings");
    }

    #[test]
    fn all_empty_yields_none() {
        assert!(resolve_label(&candidate()).is_none());
    }

    #[test]
    fn long_labels_get_ellipsis() {
        let long = "a".repeat(60);
        let out = truncate_label(&long);
        assert_eq!(out.chars().count(), MAX_LABEL_LEN);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_label("short"), "short");
        // Exactly at the limit passes through untouched.
        let exact = "b".repeat(MAX_LABEL_LEN);
        assert_eq!(truncate_label(&exact), exact);
    }

    #[test]
    fn truncation_is_char_safe() {
        let s = "é".repeat(60);
        let out = truncate_label(&s);
        assert_eq!(out.chars().count(), MAX_LABEL_LEN);
    }

    #[test]
    fn multiline_text_uses_first_line() {
        let mut c = candidate();
        c.aria_label = Some("First line\nsecond line".into());
        assert_eq!(resolve_label(&c).unwrap(), "First line");
    }

    #[test]
    fn context_id_becomes_words() {
        assert_eq!(format_context(&ContextSource::Id("main-nav".into())), "Main Nav");
        assert_eq!(format_context(&ContextSource::Id("user_menu_top".into())), "User Menu Top");
    }

    #[test]
    fn context_section_is_capitalized() {
        assert_eq!(format_context(&ContextSource::Section("nav".into())), "Nav");
    }

    #[test]
    fn context_heading_is_truncated() {
        let long = "Account settings and preferences for your workspace".to_string();
        let out = format_context(&ContextSource::Heading(long));
        assert_eq!(out.chars().count(), 30);
        assert!(out.ends_with("..."));
    }
}
