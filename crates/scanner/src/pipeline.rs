//! Candidate-to-action pipeline: classify, order, disambiguate, serialize.

use std::collections::HashMap;

use {
    skein_common::{ActionDescriptor, ActionKind, PageRef, SerializedAction, resolvable_href},
    tracing::debug,
};

use crate::{
    harvest::Harvest,
    label::{format_context, resolve_label},
    locator::build_locator,
};

/// One discovered action in both of its forms. The descriptor drives in-page
/// execution by live handle; the serialized form crosses the protocol
/// boundary.
#[derive(Debug, Clone)]
pub struct ScannedAction {
    pub descriptor: ActionDescriptor,
    pub serialized: SerializedAction,
}

/// The result of one scan: where it ran and what it found, in presentation
/// order.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub url: String,
    pub title: String,
    pub actions: Vec<ScannedAction>,
}

impl ScanOutcome {
    #[must_use]
    pub fn serialized(&self) -> Vec<SerializedAction> {
        self.actions.iter().map(|a| a.serialized.clone()).collect()
    }
}

/// Turn a harvest into the final action list.
///
/// Candidates without a resolvable label are dropped. Survivors are stable
/// sorted by kind priority (buttons, interactives, inputs, links), so ties
/// keep document order. Duplicate labels are disambiguated with an ancestor
/// context prefix when one exists, and with a 1-based counter suffix when
/// labels still collide. Ids are `action-{index}` over the final order.
#[must_use]
pub fn build_actions(harvest: Harvest) -> ScanOutcome {
    struct Entry {
        page_ref: u32,
        raw_label: String,
        display: String,
        kind: ActionKind,
        target_href: Option<String>,
        locator: String,
        bounds: Option<skein_common::ActionBounds>,
        context: Option<String>,
    }

    let total = harvest.candidates.len();
    let mut entries: Vec<Entry> = harvest
        .candidates
        .iter()
        .filter_map(|candidate| {
            let raw_label = resolve_label(candidate)?;
            let kind = ActionKind::classify(&candidate.tag, candidate.role.as_deref());
            let target_href = (candidate.tag == "a")
                .then_some(candidate.href.as_deref())
                .flatten()
                .and_then(resolvable_href);
            Some(Entry {
                page_ref: candidate.page_ref,
                display: raw_label.clone(),
                raw_label,
                kind,
                target_href,
                locator: build_locator(candidate.own_id.as_deref(), &candidate.tag, &candidate.path),
                bounds: candidate.bounds,
                context: candidate.context.as_ref().map(format_context),
            })
        })
        .collect();

    debug!(
        url = %harvest.url,
        candidates = total,
        labelled = entries.len(),
        "built action list"
    );

    // Stable by construction, so document order breaks ties.
    entries.sort_by_key(|e| e.kind.priority());

    // First pass: prefix duplicates that have an ancestor context.
    let mut raw_counts: HashMap<&str, usize> = HashMap::new();
    for entry in &entries {
        *raw_counts.entry(entry.raw_label.as_str()).or_default() += 1;
    }
    let duplicated: Vec<bool> = entries
        .iter()
        .map(|e| raw_counts.get(e.raw_label.as_str()).copied().unwrap_or(0) > 1)
        .collect();
    for (entry, is_dup) in entries.iter_mut().zip(&duplicated) {
        if *is_dup
            && let Some(context) = entry.context.as_deref()
        {
            entry.display = format!("{context} > {}", entry.raw_label);
        }
    }

    // Second pass: number whatever still collides.
    let mut display_counts: HashMap<String, usize> = HashMap::new();
    for entry in &entries {
        *display_counts.entry(entry.display.clone()).or_default() += 1;
    }
    let mut seen: HashMap<String, usize> = HashMap::new();
    for entry in &mut entries {
        if display_counts.get(&entry.display).copied().unwrap_or(0) > 1 {
            let n = seen.entry(entry.display.clone()).or_default();
            *n += 1;
            entry.display = format!("{} ({n})", entry.display);
        }
    }

    let actions = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = format!("action-{index}");
            ScannedAction {
                descriptor: ActionDescriptor {
                    id: id.clone(),
                    label: entry.display.clone(),
                    raw_label: entry.raw_label.clone(),
                    kind: entry.kind,
                    page_ref: PageRef(entry.page_ref),
                },
                serialized: SerializedAction {
                    id,
                    label: entry.display,
                    raw_label: entry.raw_label,
                    kind: entry.kind,
                    target_href: entry.target_href,
                    locator: entry.locator,
                    bounds: entry.bounds,
                },
            }
        })
        .collect();

    ScanOutcome { url: harvest.url, title: harvest.title, actions }
}
