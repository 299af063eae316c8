use crate::catalog::{ActionCatalog, ActionId};
use shae_api::UiAction;

/// Reply-borne hint that one catalog action fits right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSignal {
    pub action_id: ActionId,
}

impl SuggestionSignal {
    pub fn new(action_id: impl Into<ActionId>) -> Self {
        Self {
            action_id: action_id.into(),
        }
    }
}

/// How loudly to report suggestions the local catalog cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownIdPolicy {
    /// Warn; id-space drift between client and service should be noticed in development.
    #[default]
    Loud,
    Quiet,
}

/// Turns a reply's `ui_actions` into at most one suggestion signal.
///
/// The gate never looks at message text. Only the first element is considered;
/// it is forwarded when it is a micro-action the catalog knows.
pub struct SuggestionGate<'a> {
    catalog: &'a ActionCatalog,
    policy: UnknownIdPolicy,
}

impl<'a> SuggestionGate<'a> {
    pub fn new(catalog: &'a ActionCatalog, policy: UnknownIdPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn evaluate(&self, ui_actions: &[UiAction]) -> Option<SuggestionSignal> {
        let first = ui_actions.first()?;
        if ui_actions.len() > 1 {
            tracing::debug!(
                offered = ui_actions.len(),
                kept = %first.id,
                "reply carried several ui_actions; using the first"
            );
        }
        if !first.is_micro_action() {
            tracing::debug!(kind = %first.kind, "ignoring non micro_action ui hint");
            return None;
        }
        if !self.catalog.contains(&first.id) {
            match self.policy {
                UnknownIdPolicy::Loud => {
                    tracing::warn!(
                        action_id = %first.id,
                        "suggested action is not in the local catalog"
                    )
                }
                UnknownIdPolicy::Quiet => {
                    tracing::debug!(action_id = %first.id, "dropping unknown suggested action")
                }
            }
            return None;
        }
        Some(SuggestionSignal::new(first.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(id: &str) -> UiAction {
        UiAction {
            kind: shae_api::MICRO_ACTION_KIND.to_string(),
            id: id.to_string(),
            label: id.to_string(),
            deeplink: format!("shae://micro/{id}"),
            params: serde_json::Value::Null,
        }
    }

    #[test]
    fn forwards_known_first_action() {
        let catalog = ActionCatalog::builtin();
        let gate = SuggestionGate::new(&catalog, UnknownIdPolicy::Quiet);
        assert_eq!(
            gate.evaluate(&[hint("two_minute_rule")]),
            Some(SuggestionSignal::new("two_minute_rule"))
        );
    }

    #[test]
    fn only_first_action_is_considered() {
        let catalog = ActionCatalog::builtin();
        let gate = SuggestionGate::new(&catalog, UnknownIdPolicy::Quiet);
        assert_eq!(
            gate.evaluate(&[hint("burn_journaling"), hint("square_breathing")]),
            Some(SuggestionSignal::new("burn_journaling"))
        );
        // An unknown first element is not replaced by a known second one.
        assert_eq!(
            gate.evaluate(&[hint("fact_vs_story"), hint("square_breathing")]),
            None
        );
    }

    #[test]
    fn drops_unknown_ids_under_both_policies() {
        let catalog = ActionCatalog::builtin();
        for policy in [UnknownIdPolicy::Loud, UnknownIdPolicy::Quiet] {
            let gate = SuggestionGate::new(&catalog, policy);
            assert_eq!(gate.evaluate(&[hint("rain_process")]), None);
        }
    }

    #[test]
    fn drops_non_micro_action_hints_and_empty_lists() {
        let catalog = ActionCatalog::builtin();
        let gate = SuggestionGate::new(&catalog, UnknownIdPolicy::Quiet);
        let mut other = hint("square_breathing");
        other.kind = "navigate".to_string();
        assert_eq!(gate.evaluate(&[other]), None);
        assert_eq!(gate.evaluate(&[]), None);
    }
}
