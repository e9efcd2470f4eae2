//! Shared action model and error plumbing used across all skein crates.

pub mod action;
pub mod chain;
pub mod error;

pub use {
    action::{
        ActionBounds, ActionCategory, ActionDescriptor, ActionKind, Confidence, EnhancedAction,
        LabelSuggestion, PageRef, SerializedAction, resolvable_href,
    },
    chain::{Chain, ChainLevel, ChainState},
    error::{Error, Result},
};
