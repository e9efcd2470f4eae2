//! Config schema types (browser, session timing, enhancement, palette).

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeinConfig {
    pub browser: BrowserConfig,
    pub session: SessionConfig,
    pub enhance: EnhanceConfig,
    pub palette: PaletteConfig,
}

/// Chrome/Chromium launch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Path to Chrome/Chromium binary (auto-detected if not set).
    pub chrome_path: Option<String>,
    /// Whether to run in headless mode.
    pub headless: bool,
    /// Viewport width for hidden sessions.
    pub viewport_width: u32,
    /// Viewport height for hidden sessions.
    pub viewport_height: u32,
    /// User agent string (uses the browser default if not set).
    pub user_agent: Option<String>,
    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            viewport_width: 1440,
            viewport_height: 900,
            user_agent: None,
            chrome_args: Vec::new(),
        }
    }
}

/// Hidden-session timing. The settle delays are heuristic waits substituting
/// for a real "DOM quiesced" signal; the timeouts are hard deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hard deadline for a hidden session to reach load-complete, in ms.
    pub load_timeout_ms: u64,
    /// Best-effort deadline for a post-click navigation, in ms. On expiry the
    /// current URL is read instead of failing.
    pub navigation_timeout_ms: u64,
    /// Wait after performing an action before rescanning, in ms.
    pub settle_delay_ms: u64,
    /// Wait after injecting annotation overlays before screenshotting, in ms.
    pub annotate_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            navigation_timeout_ms: 10_000,
            settle_delay_ms: 800,
            annotate_delay_ms: 200,
        }
    }
}

/// AI label-enhancement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Whether enhancement requests are honoured at all.
    pub enabled: bool,
    /// Model identifier for the suggestion service.
    pub model: String,
    /// Cache time-to-live for enhanced results, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-3-flash-preview".into(),
            cache_ttl_secs: 300,
        }
    }
}

/// In-page palette behaviour that the orchestrator must know about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Minimum interval between accepted toggle events, in ms. Both the
    /// global shortcut and the in-page key combination funnel through this.
    pub toggle_debounce_ms: u64,
    /// Selector of the palette's own root element, excluded from scans.
    pub exclude_selector: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            toggle_debounce_ms: 100,
            exclude_selector: "#skein-root".into(),
        }
    }
}
