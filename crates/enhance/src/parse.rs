//! Tolerant parsing of model output.

use std::sync::LazyLock;

use {regex::Regex, skein_common::LabelSuggestion, tracing::warn};

// Models wrap JSON in markdown fences more often than not.
static FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.+?)\s*```").ok());

/// Parse the model's reply into suggestions. Accepts a bare JSON array, a
/// fenced ```` ```json ```` block, or an array embedded in prose. Anything
/// else parses to zero suggestions; enhancement never fails a request over
/// model output.
#[must_use]
pub fn parse_suggestions(text: &str) -> Vec<LabelSuggestion> {
    let candidate = extract_json(text);
    match serde_json::from_str::<Vec<LabelSuggestion>>(candidate) {
        Ok(suggestions) => suggestions,
        Err(error) => {
            warn!(%error, "could not parse suggestion output, dropping");
            Vec::new()
        },
    }
}

fn extract_json(text: &str) -> &str {
    if let Some(re) = FENCE.as_ref()
        && let Some(captures) = re.captures(text)
        && let Some(inner) = captures.get(1)
    {
        return inner.as_str();
    }
    // Fall back to the outermost bracket pair.
    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']'))
        && start < end
    {
        return &text[start..=end];
    }
    text.trim()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, skein_common::{ActionCategory, Confidence}};

    const SUGGESTION: &str = r#"[{
        "index": 1,
        "originalLabel": "More",
        "suggestedLabel": "Open account menu",
        "category": "navigation",
        "reason": "The button opens the account dropdown.",
        "confidence": "high"
    }]"#;

    #[test]
    fn parses_bare_array() {
        let out = parse_suggestions(SUGGESTION);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].index, 1);
        assert_eq!(out[0].category, ActionCategory::Navigation);
        assert_eq!(out[0].confidence, Confidence::High);
        assert_eq!(out[0].suggested_label.as_deref(), Some("Open account menu"));
    }

    #[test]
    fn parses_fenced_block() {
        let fenced = format!("Here you go:\n```json\n{SUGGESTION}\n```\nHope that helps!");
        assert_eq!(parse_suggestions(&fenced).len(), 1);
    }

    #[test]
    fn parses_array_embedded_in_prose() {
        let prose = format!("The suggestions are {SUGGESTION} as requested.");
        assert_eq!(parse_suggestions(&prose).len(), 1);
    }

    #[test]
    fn garbage_parses_to_nothing() {
        assert!(parse_suggestions("I cannot help with that.").is_empty());
        assert!(parse_suggestions("").is_empty());
        assert!(parse_suggestions("```json\n{not valid\n```").is_empty());
    }

    #[test]
    fn null_suggested_label_means_keep_original() {
        let out = parse_suggestions(
            r#"[{"index": 2, "originalLabel": "Save", "suggestedLabel": null,
                "category": "action", "reason": "", "confidence": "medium"}]"#,
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].suggested_label.is_none());
    }
}
