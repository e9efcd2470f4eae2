//! Session error types.

use thiserror::Error;

/// Errors that can occur while driving a hidden session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The page did not reach load-complete within the hard deadline.
    #[error("Page load timeout ({0}s)")]
    LoadTimeout(u64),

    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// A chain step's locator matched nothing in the current document.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A chain step failed; the whole chain is abandoned.
    #[error("Failed to execute action: {0}")]
    ActionFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    JsEvalFailed(String),

    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error(transparent)]
    Scan(#[from] skein_scanner::ScanError),
}

impl From<chromiumoxide::error::CdpError> for SessionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SessionError::Cdp(err.to_string())
    }
}
