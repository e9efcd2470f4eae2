//! Request handling: protocol types, dispatch, caching, key storage.
//!
//! The orchestrator is the single owner of the browser host, the enhancement
//! cache, and the API key store. Requests arrive as [`protocol::Request`]
//! values (over the in-process service channel) and leave as flat
//! [`protocol::Response`] values; no live browser handles ever cross that
//! boundary.

pub mod cache;
pub mod debounce;
pub mod keystore;
pub mod orchestrator;
pub mod protocol;
pub mod service;

pub use {
    cache::EnhancementCache,
    debounce::ToggleDebouncer,
    keystore::KeyStore,
    orchestrator::Orchestrator,
    protocol::{Request, Response},
    service::{ServiceHandle, spawn},
};
