//! The two-sided action model.
//!
//! [`ActionDescriptor`] is the in-page view of an actionable element: it holds
//! a [`PageRef`], the live-element handle stamped into the document by the
//! harvest script. It is created fresh on every scan and is only meaningful
//! against the document that produced it.
//!
//! [`SerializedAction`] is the transport-safe projection that crosses the
//! agent/orchestrator boundary: no live handle, just a locator string that
//! re-resolves to exactly the source element (or fails explicitly). The two
//! types are joined only by the locator, never merged into one type with an
//! optional element field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of element an action drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Button,
    Link,
    Input,
    Interactive,
}

impl ActionKind {
    /// Presentation priority: buttons first, then generic interactives,
    /// inputs, and links last.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::Button => 0,
            Self::Interactive => 1,
            Self::Input => 2,
            Self::Link => 3,
        }
    }

    /// Classify from a tag name and optional ARIA role. An explicit
    /// `role=button`/`role=link` wins over the tag.
    #[must_use]
    pub fn classify(tag: &str, role: Option<&str>) -> Self {
        match tag {
            "button" => return Self::Button,
            "a" => return Self::Link,
            "input" | "select" | "textarea" => return Self::Input,
            _ => {},
        }
        match role {
            Some("button") => Self::Button,
            Some("link") => Self::Link,
            _ => Self::Interactive,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Input => "input",
            Self::Interactive => "interactive",
        };
        f.write_str(s)
    }
}

/// Handle to a live element inside the document that was last harvested:
/// the value of its `data-skein-ref` attribute. Never serialized across the
/// protocol boundary; invalidated by the next scan or by a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef(pub u32);

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An actionable element discovered in the live document.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    pub id: String,
    /// Disambiguated label shown to the user.
    pub label: String,
    /// Raw extracted label before disambiguation.
    pub raw_label: String,
    pub kind: ActionKind,
    /// Live-element handle, valid only in the originating document.
    pub page_ref: PageRef,
}

/// Page-space bounding box of an element, used for screenshot annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Transport-safe projection of an [`ActionDescriptor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedAction {
    pub id: String,
    pub label: String,
    pub raw_label: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Absolute target URL, present only for navigational anchors. Its
    /// presence is what makes a chain step a "navigate" step rather than a
    /// "perform-then-rescan" step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_href: Option<String>,
    /// CSS locator sufficient to re-find the element in the same document
    /// state.
    pub locator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ActionBounds>,
}

impl SerializedAction {
    /// Whether executing this action is expected to navigate the page.
    #[must_use]
    pub fn is_navigational(&self) -> bool {
        self.target_href.is_some()
    }
}

/// Parse an anchor href into an absolute http(s) URL, or `None` when the
/// value does not resolve to one (fragments, `javascript:`, mailto, …).
#[must_use]
pub fn resolvable_href(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed.into()),
        _ => None,
    }
}

// ── Enhancement types ───────────────────────────────────────────────────────

/// Coarse category assigned by the suggestion service, used for palette
/// filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Navigation,
    Action,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One suggestion returned by the label-suggestion service for the action at
/// the given 1-based index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSuggestion {
    pub index: usize,
    #[serde(default)]
    pub original_label: String,
    #[serde(default)]
    pub suggested_label: Option<String>,
    pub category: ActionCategory,
    #[serde(default)]
    pub reason: String,
    pub confidence: Confidence,
}

/// A serialized action with suggestion-service augmentations layered on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedAction {
    #[serde(flatten)]
    pub action: SerializedAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ActionCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhance_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl From<SerializedAction> for EnhancedAction {
    fn from(action: SerializedAction) -> Self {
        Self {
            action,
            category: None,
            enhanced_label: None,
            enhance_reason: None,
            confidence: None,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_action() -> SerializedAction {
        SerializedAction {
            id: "action-0".into(),
            label: "Sign in".into(),
            raw_label: "Sign in".into(),
            kind: ActionKind::Button,
            target_href: None,
            locator: "#signin".into(),
            bounds: None,
        }
    }

    #[test]
    fn kind_priority_orders_buttons_before_links() {
        assert!(ActionKind::Button.priority() < ActionKind::Interactive.priority());
        assert!(ActionKind::Interactive.priority() < ActionKind::Input.priority());
        assert!(ActionKind::Input.priority() < ActionKind::Link.priority());
    }

    #[test]
    fn classify_role_overrides_unknown_tag() {
        assert_eq!(ActionKind::classify("div", Some("button")), ActionKind::Button);
        assert_eq!(ActionKind::classify("span", Some("link")), ActionKind::Link);
        assert_eq!(ActionKind::classify("div", None), ActionKind::Interactive);
    }

    #[test]
    fn classify_tag_wins_over_role() {
        // <button role="link"> still classifies by tag.
        assert_eq!(ActionKind::classify("button", Some("link")), ActionKind::Button);
        assert_eq!(ActionKind::classify("a", Some("button")), ActionKind::Link);
    }

    #[test]
    fn serialized_action_wire_format() {
        let mut action = sample_action();
        action.target_href = Some("https://example.com/".into());
        let v = serde_json::to_value(&action).unwrap();
        assert_eq!(v["type"], "button");
        assert_eq!(v["rawLabel"], "Sign in");
        assert_eq!(v["targetHref"], "https://example.com/");
        assert!(v.get("bounds").is_none());
    }

    #[test]
    fn resolvable_href_rejects_non_http() {
        assert_eq!(
            resolvable_href("https://example.com/a"),
            Some("https://example.com/a".into())
        );
        assert!(resolvable_href("javascript:void(0)").is_none());
        assert!(resolvable_href("mailto:x@example.com").is_none());
        assert!(resolvable_href("/relative/path").is_none());
    }

    #[test]
    fn enhanced_action_flattens_base_fields() {
        let enhanced = EnhancedAction {
            category: Some(ActionCategory::Action),
            enhanced_label: Some("Sign in to your account".into()),
            ..EnhancedAction::from(sample_action())
        };
        let v = serde_json::to_value(&enhanced).unwrap();
        assert_eq!(v["id"], "action-0");
        assert_eq!(v["category"], "action");
        assert_eq!(v["enhancedLabel"], "Sign in to your account");
        assert!(v.get("enhanceReason").is_none());
    }
}
