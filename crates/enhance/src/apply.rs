//! Layering suggestions onto the scanned action list.

use {
    skein_common::{EnhancedAction, LabelSuggestion, SerializedAction},
    tracing::debug,
};

/// Apply suggestions to the action list by 1-based index. Suggestions whose
/// index falls outside the list are ignored; actions the model skipped come
/// back unenhanced. The list's order and length never change.
#[must_use]
pub fn apply_suggestions(
    actions: Vec<SerializedAction>,
    suggestions: &[LabelSuggestion],
) -> Vec<EnhancedAction> {
    let mut enhanced: Vec<EnhancedAction> = actions.into_iter().map(Into::into).collect();

    for suggestion in suggestions {
        let Some(slot) = suggestion
            .index
            .checked_sub(1)
            .and_then(|i| enhanced.get_mut(i))
        else {
            debug!(index = suggestion.index, "suggestion index out of range, skipping");
            continue;
        };
        slot.category = Some(suggestion.category);
        slot.enhanced_label = suggestion.suggested_label.clone();
        slot.enhance_reason =
            (!suggestion.reason.is_empty()).then(|| suggestion.reason.clone());
        slot.confidence = Some(suggestion.confidence);
    }

    enhanced
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        skein_common::{ActionCategory, ActionKind, Confidence},
    };

    fn action(label: &str) -> SerializedAction {
        SerializedAction {
            id: format!("action-{label}"),
            label: label.into(),
            raw_label: label.into(),
            kind: ActionKind::Button,
            target_href: None,
            locator: format!("#{label}"),
            bounds: None,
        }
    }

    fn suggestion(index: usize, label: Option<&str>) -> LabelSuggestion {
        LabelSuggestion {
            index,
            original_label: String::new(),
            suggested_label: label.map(Into::into),
            category: ActionCategory::Action,
            reason: "test".into(),
            confidence: Confidence::Medium,
        }
    }

    #[test]
    fn applies_by_one_based_index() {
        let out = apply_suggestions(
            vec![action("a"), action("b")],
            &[suggestion(2, Some("Better B"))],
        );
        assert!(out[0].enhanced_label.is_none());
        assert_eq!(out[1].enhanced_label.as_deref(), Some("Better B"));
        assert_eq!(out[1].category, Some(ActionCategory::Action));
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let out = apply_suggestions(
            vec![action("a")],
            &[suggestion(0, Some("x")), suggestion(5, Some("y"))],
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].enhanced_label.is_none());
    }

    #[test]
    fn order_and_length_are_preserved() {
        let out = apply_suggestions(
            vec![action("a"), action("b"), action("c")],
            &[suggestion(1, None)],
        );
        let ids: Vec<&str> = out.iter().map(|e| e.action.id.as_str()).collect();
        assert_eq!(ids, ["action-a", "action-b", "action-c"]);
        // A null suggested label still carries the category.
        assert_eq!(out[0].category, Some(ActionCategory::Action));
        assert!(out[0].enhanced_label.is_none());
    }
}
