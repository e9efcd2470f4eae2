//! Gemini suggestion client.

use {
    secrecy::{ExposeSecret, SecretString},
    serde_json::{Value, json},
    skein_common::{LabelSuggestion, SerializedAction},
    tracing::debug,
};

use crate::{EnhanceError, parse::parse_suggestions};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Calls the Gemini `generateContent` endpoint to get label suggestions for a
/// scanned action list.
pub struct SuggestionClient {
    http: reqwest::Client,
    model: String,
    endpoint: String,
}

impl SuggestionClient {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the client at a different base URL (used by tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Ask the model for better labels, showing it the annotated screenshot
    /// when one is available. Returns zero suggestions when the model's
    /// output cannot be parsed; transport failures are errors.
    pub async fn suggest(
        &self,
        api_key: &SecretString,
        actions: &[SerializedAction],
        page_url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<LabelSuggestion>, EnhanceError> {
        let body = build_body(&build_prompt(actions, page_url), screenshot);

        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| EnhanceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnhanceError::Status(status.as_u16()));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| EnhanceError::Request(e.to_string()))?;
        let text = value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default();

        let suggestions = parse_suggestions(text);
        debug!(
            model = %self.model,
            actions = actions.len(),
            suggestions = suggestions.len(),
            "suggestion request complete"
        );
        Ok(suggestions)
    }
}

/// Assemble the `generateContent` body. The screenshot (base64 JPEG, numbered
/// overlays matching the prompt's indices) goes in first as an `inline_data`
/// part so the model sees the page the labels came from.
fn build_body(prompt: &str, screenshot: Option<&str>) -> Value {
    let mut parts = Vec::new();
    if let Some(data) = screenshot {
        parts.push(json!({
            "inline_data": { "mime_type": "image/jpeg", "data": data },
        }));
    }
    parts.push(json!({ "text": prompt }));
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": { "temperature": 0.2 },
    })
}

/// Render the action list into the suggestion prompt. Indices are 1-based and
/// must come back unchanged for [`crate::apply_suggestions`] to line up.
fn build_prompt(actions: &[SerializedAction], page_url: &str) -> String {
    use std::fmt::Write as _;

    let mut listing = String::new();
    for (i, action) in actions.iter().enumerate() {
        let _ = write!(listing, "{}. [{}] \"{}\"", i + 1, action.kind, action.label);
        if let Some(href) = &action.target_href {
            let _ = write!(listing, " -> {href}");
        }
        listing.push('\n');
    }

    format!(
        "You are labelling UI actions found on the page {page_url}.\n\
         For each numbered action below, suggest a clearer label when the \
         current one is vague, and categorize it.\n\n\
         Actions:\n{listing}\n\
         Respond with ONLY a JSON array. Each element must have:\n\
         - \"index\": the action's number above\n\
         - \"originalLabel\": the label as given\n\
         - \"suggestedLabel\": a clearer label, or null to keep the original\n\
         - \"category\": one of \"navigation\", \"action\", \"input\"\n\
         - \"reason\": one short sentence\n\
         - \"confidence\": one of \"high\", \"medium\", \"low\"\n"
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, skein_common::ActionKind};

    #[test]
    fn prompt_numbers_actions_from_one() {
        let actions = vec![
            SerializedAction {
                id: "action-0".into(),
                label: "Save".into(),
                raw_label: "Save".into(),
                kind: ActionKind::Button,
                target_href: None,
                locator: "#save".into(),
                bounds: None,
            },
            SerializedAction {
                id: "action-1".into(),
                label: "Docs".into(),
                raw_label: "Docs".into(),
                kind: ActionKind::Link,
                target_href: Some("https://example.com/docs".into()),
                locator: "#docs".into(),
                bounds: None,
            },
        ];
        let prompt = build_prompt(&actions, "https://example.com/");
        assert!(prompt.contains("1. [button] \"Save\""));
        assert!(prompt.contains("2. [link] \"Docs\" -> https://example.com/docs"));
    }

    #[test]
    fn body_carries_screenshot_before_the_prompt() {
        let body = build_body("prompt text", Some("aGVsbG8="));
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[0]["inline_data"]["data"], "aGVsbG8=");
        assert_eq!(parts[1]["text"], "prompt text");
    }

    #[test]
    fn body_without_screenshot_is_text_only() {
        let body = build_body("prompt text", None);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "prompt text");
    }
}
