//! The typed request/response protocol.
//!
//! Requests are tagged by a SCREAMING_SNAKE `type` field; responses are one
//! flat shape with `success` always present and everything else optional.
//! Unknown request types fail deserialization, which callers surface as a
//! protocol error rather than a crash.

use {
    serde::{Deserialize, Serialize},
    skein_common::{EnhancedAction, SerializedAction},
};

/// A request from a palette surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Preview the actions reachable through `action` (or directly at `url`
    /// when no action is given) without touching the visible page.
    #[serde(rename = "SCAN_FUTURE_ACTIONS")]
    ScanFutureActions {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action: Option<SerializedAction>,
    },

    /// Replay a committed chain in a hidden session, then redirect the
    /// visible tab to wherever it landed.
    #[serde(rename = "EXECUTE_CHAIN")]
    ExecuteChain { chain: Vec<SerializedAction> },

    /// Annotated screenshot of the visible tab.
    #[serde(rename = "CAPTURE_SCREENSHOT")]
    CaptureScreenshot,

    /// Ask the suggestion service for better labels.
    #[serde(rename = "ENHANCE_ACTIONS")]
    EnhanceActions { actions: Vec<SerializedAction>, url: String },

    /// Palette toggle, subject to the debounce window.
    #[serde(rename = "TOGGLE_PALETTE")]
    TogglePalette,

    #[serde(rename = "GET_API_KEY")]
    GetApiKey,

    #[serde(rename = "SET_API_KEY", rename_all = "camelCase")]
    SetApiKey { api_key: String },
}

/// The one response shape. `success: false` carries `error`; everything else
/// is populated per operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<SerializedAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_actions: Option<Vec<EnhancedAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Response {
    #[must_use]
    pub fn ok() -> Self {
        Self { success: true, ..Self::default() }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), ..Self::default() }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Vec<SerializedAction>) -> Self {
        self.actions = Some(actions);
        self
    }

    #[must_use]
    pub fn with_page(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, data_uri: impl Into<String>) -> Self {
        self.image_data = Some(data_uri.into());
        self
    }

    #[must_use]
    pub fn with_enhanced(mut self, enhanced: Vec<EnhancedAction>, from_cache: bool) -> Self {
        self.enhanced_actions = Some(enhanced);
        self.from_cache = Some(from_cache);
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }
}
