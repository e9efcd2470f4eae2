//! Action chains and chain-level bookkeeping.
//!
//! A chain is the ordered list of actions the user committed to replay; chain
//! levels are the per-page snapshots accumulated while drilling down. Levels
//! form a list, not a graph: a level's existence implies every prior level
//! succeeded.

use serde::{Deserialize, Serialize};

use crate::{
    action::SerializedAction,
    error::{Error, Result},
};

/// One step in a user-authored drill-down: the page reached, the actions
/// discovered there, and the action used to reach the *next* level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainLevel {
    pub url: String,
    pub page_title: String,
    pub actions: Vec<SerializedAction>,
    pub selected_action: SerializedAction,
}

/// An ordered, non-empty list of actions whose first entry is navigational.
/// Constructing one validates the invariant, so the executor never has to
/// re-check it. Deliberately not `Deserialize`: untrusted payloads come in as
/// plain vectors and pass through [`Chain::new`].
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Chain(Vec<SerializedAction>);

impl Chain {
    pub fn new(actions: Vec<SerializedAction>) -> Result<Self> {
        let Some(first) = actions.first() else {
            return Err(Error::message("Chain must not be empty"));
        };
        if !first.is_navigational() {
            return Err(Error::message("Chain must start with a link action"));
        }
        Ok(Self(actions))
    }

    /// The navigational action that opens the chain. `new` guarantees the
    /// list is non-empty and the first entry carries a target href.
    #[must_use]
    pub fn first(&self) -> &SerializedAction {
        &self.0[0]
    }

    /// Steps after the opening navigation.
    #[must_use]
    pub fn rest(&self) -> &[SerializedAction] {
        &self.0[1..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: [`Chain::new`] rejects empty input, so a constructed
    /// chain has at least its opening navigation. Kept so `len` has its
    /// conventional companion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn actions(&self) -> &[SerializedAction] {
        &self.0
    }
}

/// Mutable drill-down state held by the in-page agent while the palette is
/// open. Discarded entirely when the palette closes.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    levels: Vec<ChainLevel>,
}

impl ChainState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn levels(&self) -> &[ChainLevel] {
        &self.levels
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<&ChainLevel> {
        self.levels.last()
    }

    /// Append a level after a successful drill-down.
    pub fn push(&mut self, level: ChainLevel) {
        self.levels.push(level);
    }

    /// Navigate backward: keep levels `0..=target`, or clear everything when
    /// `target` is `None` (back to the live page).
    pub fn truncate_to(&mut self, target: Option<usize>) {
        match target {
            Some(index) => self.levels.truncate(index + 1),
            None => self.levels.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Build the committed chain from the selected action of each level,
    /// optionally extended with one final selection from the current level.
    pub fn to_chain(&self, extra: Option<SerializedAction>) -> Result<Chain> {
        let mut actions: Vec<SerializedAction> =
            self.levels.iter().map(|l| l.selected_action.clone()).collect();
        if let Some(extra) = extra {
            actions.push(extra);
        }
        Chain::new(actions)
    }
}
