//! AI label enhancement: suggestion client, response parsing, layering.
//!
//! Enhancement is decorative. Every failure mode on this path (missing key,
//! transport error, malformed model output) degrades to the original action
//! list rather than failing the request that asked for it.

pub mod apply;
pub mod client;
pub mod parse;

pub use {apply::apply_suggestions, client::SuggestionClient, parse::parse_suggestions};

/// Errors from the suggestion service transport. Malformed model *output* is
/// not an error; it parses to zero suggestions.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("suggestion request failed: {0}")]
    Request(String),

    #[error("suggestion service returned status {0}")]
    Status(u16),
}
