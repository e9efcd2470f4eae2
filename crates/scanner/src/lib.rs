//! Action discovery: harvest script, label extraction, locator assembly.
//!
//! Discovery is split in two. A single injected script walks the live DOM,
//! stamps each actionable element with a `data-skein-ref` attribute, and
//! returns raw per-element facts (tag, label sources, ancestor context, path
//! segments, bounds). Everything that is policy rather than DOM access — label
//! priority, truncation, disambiguation, classification, ordering, locator
//! assembly — happens on this side, where it is testable without a browser.

pub mod harvest;
pub mod label;
pub mod locator;
pub mod pipeline;

pub use {
    harvest::{ContextSource, Harvest, PathSegment, RawCandidate, harvest_script, parse_harvest},
    label::{format_context, resolve_label, truncate_label},
    locator::{build_locator, css_escape},
    pipeline::{ScanOutcome, ScannedAction, build_actions},
};

/// Errors produced while interpreting a harvest payload.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("malformed harvest payload: {0}")]
    MalformedHarvest(String),
}
