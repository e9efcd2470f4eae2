//! Hidden browser sessions: preview scans, chain execution, screenshots.
//!
//! A [`BrowserHost`] owns one lazily-launched headless browser. Every request
//! that needs a page gets a fresh one through a [`HiddenSession`]; sessions
//! are never pooled or reused, and are closed (best effort) on every exit
//! path so a failed preview cannot leak a page.

pub mod chain;
pub mod error;
pub mod hidden;
pub mod host;

pub use {chain::ChainExecutor, error::SessionError, hidden::HiddenSession, host::BrowserHost};
