//! Pending/active/completed progression of micro-actions within one session.
//!
//! ```text
//! Idle --offer--> Suggested --start--> Active --complete--> Idle
//!                     |                  |
//!                     +------skip--------+-----skip-------> Idle
//! ```
//!
//! Transitions never mutate the receiver. Each returns the next state plus the
//! transcript effects the caller must apply, in order.

use crate::catalog::{ActionCatalog, ActionId};
use crate::error::{InvalidTransition, LifecycleEvent, Rejected};
use crate::gate::SuggestionSignal;
use crate::transcript::Sender;

pub const SKIP_ACKNOWLEDGEMENT: &str =
    "That's okay. I'm here whenever you're ready. What else is on your mind?";
pub const COMPLETION_AFFIRMATION: &str = "Nice work. How are you feeling now?";

pub fn completion_notice(title: &str) -> String {
    format!("✓ Completed: {title}")
}

/// Presentation pacing slot for an effect; the runtime maps it to a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Immediate,
    SkipAcknowledgement,
    CompletionAffirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Append {
        sender: Sender,
        text: String,
        delay: Delay,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: LifecycleState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: LifecycleState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<'a> {
    Idle,
    Suggested(&'a ActionId),
    Active(&'a ActionId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleState {
    pending: Option<ActionId>,
    active: Option<ActionId>,
    /// Completion order.
    completed: Vec<ActionId>,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&ActionId> {
        self.pending.as_ref()
    }

    pub fn active(&self) -> Option<&ActionId> {
        self.active.as_ref()
    }

    pub fn completed(&self) -> &[ActionId] {
        &self.completed
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|c| c.as_str() == id)
    }

    pub fn phase(&self) -> Phase<'_> {
        match (&self.pending, &self.active) {
            (_, Some(active)) => Phase::Active(active),
            (Some(pending), None) => Phase::Suggested(pending),
            (None, None) => Phase::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase(), Phase::Idle)
    }

    pub fn offer_suggestion(
        &self,
        catalog: &ActionCatalog,
        signal: &SuggestionSignal,
    ) -> Result<Transition, Rejected> {
        let id = &signal.action_id;
        if !catalog.contains(id) {
            return Err(Rejected::UnknownAction(id.clone()));
        }
        if self.is_completed(id) {
            return Err(Rejected::AlreadyCompleted(id.clone()));
        }
        match self.phase() {
            Phase::Idle => {}
            Phase::Suggested(current) => {
                return Err(Rejected::Busy {
                    state: "pending",
                    current: current.clone(),
                });
            }
            Phase::Active(current) => {
                return Err(Rejected::Busy {
                    state: "active",
                    current: current.clone(),
                });
            }
        }

        let mut next = self.clone();
        next.pending = Some(id.clone());
        Ok(Transition::quiet(next))
    }

    pub fn start(&self, action_id: &str) -> Result<Transition, InvalidTransition> {
        if self.pending.as_deref() != Some(action_id) {
            return Err(self.invalid(LifecycleEvent::Start, action_id));
        }
        let mut next = self.clone();
        next.active = next.pending.take();
        Ok(Transition::quiet(next))
    }

    /// Allowed while suggested or active. The action stays eligible for re-suggestion.
    pub fn skip(&self, action_id: &str) -> Result<Transition, InvalidTransition> {
        let mut next = self.clone();
        if next.active.as_deref() == Some(action_id) {
            next.active = None;
        } else if next.pending.as_deref() == Some(action_id) {
            next.pending = None;
        } else {
            return Err(self.invalid(LifecycleEvent::Skip, action_id));
        }
        Ok(Transition {
            state: next,
            effects: vec![Effect::Append {
                sender: Sender::Companion,
                text: SKIP_ACKNOWLEDGEMENT.to_string(),
                delay: Delay::SkipAcknowledgement,
            }],
        })
    }

    pub fn complete(
        &self,
        catalog: &ActionCatalog,
        action_id: &str,
    ) -> Result<Transition, InvalidTransition> {
        if self.active.as_deref() != Some(action_id) {
            return Err(self.invalid(LifecycleEvent::Complete, action_id));
        }
        let mut next = self.clone();
        let Some(id) = next.active.take() else {
            return Err(self.invalid(LifecycleEvent::Complete, action_id));
        };

        let mut effects = Vec::with_capacity(2);
        match catalog.get(&id) {
            Some(action) => effects.push(Effect::Append {
                sender: Sender::System,
                text: completion_notice(&action.title),
                delay: Delay::Immediate,
            }),
            None => tracing::warn!(action_id = %id, "completed action missing from catalog"),
        }
        next.completed.push(id);
        effects.push(Effect::Append {
            sender: Sender::Companion,
            text: COMPLETION_AFFIRMATION.to_string(),
            delay: Delay::CompletionAffirmation,
        });

        Ok(Transition {
            state: next,
            effects,
        })
    }

    fn invalid(&self, event: LifecycleEvent, action_id: &str) -> InvalidTransition {
        InvalidTransition {
            event,
            action_id: ActionId::new(action_id),
            pending: self.pending.clone(),
            active: self.active.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionCategory, MicroAction};

    fn two_action_catalog() -> ActionCatalog {
        ActionCatalog::new(vec![
            MicroAction {
                id: ActionId::new("A"),
                category: ActionCategory::Stabilize,
                title: "Alpha".to_string(),
                description: String::new(),
                duration_seconds: Some(60),
                requires_consent_notice: false,
            },
            MicroAction {
                id: ActionId::new("B"),
                category: ActionCategory::Release,
                title: "Bravo".to_string(),
                description: String::new(),
                duration_seconds: None,
                requires_consent_notice: true,
            },
        ])
        .expect("valid catalog")
    }

    fn offer(
        state: &LifecycleState,
        catalog: &ActionCatalog,
        id: &str,
    ) -> Result<LifecycleState, Rejected> {
        state
            .offer_suggestion(catalog, &SuggestionSignal::new(id))
            .map(|t| t.state)
    }

    fn appended(effects: &[Effect]) -> Vec<(Sender, &str, Delay)> {
        effects
            .iter()
            .map(|Effect::Append { sender, text, delay }| (*sender, text.as_str(), *delay))
            .collect()
    }

    #[test]
    fn offers_are_dropped_while_pending_or_active() {
        let catalog = ActionCatalog::builtin();
        let suggested =
            offer(&LifecycleState::new(), &catalog, "square_breathing").expect("accepted");
        let active = suggested.start("square_breathing").expect("start").state;

        for state in [&suggested, &active] {
            for action in catalog.iter() {
                let err = state
                    .offer_suggestion(&catalog, &SuggestionSignal::new(action.id.as_str()))
                    .expect_err("busy");
                assert!(matches!(err, Rejected::Busy { .. }), "{err}");
            }
        }
        assert_eq!(suggested.pending().map(|id| id.as_str()), Some("square_breathing"));
        assert_eq!(active.active().map(|id| id.as_str()), Some("square_breathing"));
        assert_eq!(active.pending(), None);
    }

    #[test]
    fn completed_actions_are_never_resuggested() {
        let catalog = ActionCatalog::builtin();
        for action in catalog.iter() {
            let id = action.id.as_str();
            let state = offer(&LifecycleState::new(), &catalog, id).expect("accepted");
            let state = state.start(id).expect("start").state;
            let state = state.complete(&catalog, id).expect("complete").state;
            assert_eq!(
                offer(&state, &catalog, id).expect_err("completed"),
                Rejected::AlreadyCompleted(ActionId::new(id))
            );
        }
    }

    #[test]
    fn skipped_actions_remain_eligible() {
        let catalog = ActionCatalog::builtin();
        for action in catalog.iter() {
            let id = action.id.as_str();
            let state = offer(&LifecycleState::new(), &catalog, id).expect("accepted");
            let skipped = state.skip(id).expect("skip");
            assert!(skipped.state.is_idle());
            assert!(!skipped.state.is_completed(id));
            let again = offer(&skipped.state, &catalog, id).expect("re-offer accepted");
            assert_eq!(again.pending().map(|p| p.as_str()), Some(id));
        }
    }

    #[test]
    fn complete_emits_system_entry_then_affirmation() {
        let catalog = ActionCatalog::builtin();
        let state = offer(&LifecycleState::new(), &catalog, "two_minute_rule").expect("accepted");
        let state = state.start("two_minute_rule").expect("start").state;
        let done = state.complete(&catalog, "two_minute_rule").expect("complete");

        assert_eq!(
            appended(&done.effects),
            vec![
                (Sender::System, "✓ Completed: 2-Minute Rule", Delay::Immediate),
                (
                    Sender::Companion,
                    COMPLETION_AFFIRMATION,
                    Delay::CompletionAffirmation
                ),
            ]
        );
        assert_eq!(done.state.active(), None);
        assert_eq!(done.state.completed(), [ActionId::new("two_minute_rule")]);
        assert!(done.state.is_idle());
    }

    #[test]
    fn busy_offer_then_skip_then_accept() {
        let catalog = two_action_catalog();
        let suggested_a = offer(&LifecycleState::new(), &catalog, "A").expect("A accepted");
        assert_eq!(suggested_a.phase(), Phase::Suggested(&ActionId::new("A")));

        let err = offer(&suggested_a, &catalog, "B").expect_err("B rejected while A pending");
        assert_eq!(
            err,
            Rejected::Busy {
                state: "pending",
                current: ActionId::new("A")
            }
        );

        let skipped = suggested_a.skip("A").expect("skip A");
        assert!(skipped.state.is_idle());
        assert_eq!(
            appended(&skipped.effects),
            vec![(
                Sender::Companion,
                SKIP_ACKNOWLEDGEMENT,
                Delay::SkipAcknowledgement
            )]
        );

        let suggested_b = offer(&skipped.state, &catalog, "B").expect("B accepted once idle");
        assert_eq!(suggested_b.phase(), Phase::Suggested(&ActionId::new("B")));
    }

    #[test]
    fn skip_during_exercise_leaves_action_eligible() {
        let catalog = two_action_catalog();
        let state = offer(&LifecycleState::new(), &catalog, "A").expect("accepted");
        let state = state.start("A").expect("start").state;
        let skipped = state.skip("A").expect("skip while active");

        assert_eq!(skipped.state.active(), None);
        assert!(!skipped.state.is_completed("A"));
        assert_eq!(skipped.effects.len(), 1);
        assert!(offer(&skipped.state, &catalog, "A").is_ok());
    }

    #[test]
    fn unknown_ids_are_rejected_in_every_state() {
        let catalog = two_action_catalog();
        let idle = LifecycleState::new();
        let suggested = offer(&idle, &catalog, "A").expect("accepted");
        let active = suggested.start("A").expect("start").state;
        let after = active.complete(&catalog, "A").expect("complete").state;

        for state in [&idle, &suggested, &active, &after] {
            assert_eq!(
                offer(state, &catalog, "nonexistent").expect_err("unknown"),
                Rejected::UnknownAction(ActionId::new("nonexistent"))
            );
        }
    }

    #[test]
    fn mismatched_events_are_rejected_without_changing_state() {
        let catalog = two_action_catalog();
        let idle = LifecycleState::new();
        assert!(idle.start("A").is_err());
        assert!(idle.skip("A").is_err());
        assert!(idle.complete(&catalog, "A").is_err());

        let suggested = offer(&idle, &catalog, "A").expect("accepted");
        let err = suggested.start("B").expect_err("stale start");
        assert_eq!(err.event, LifecycleEvent::Start);
        assert_eq!(err.pending, Some(ActionId::new("A")));
        // Completing requires the action to be active, not merely suggested.
        assert!(suggested.complete(&catalog, "A").is_err());

        let active = suggested.start("A").expect("start").state;
        assert!(active.start("A").is_err());
        assert!(active.skip("B").is_err());
        assert!(active.complete(&catalog, "B").is_err());
        assert_eq!(active.active(), Some(&ActionId::new("A")));
    }

    #[test]
    fn completion_order_is_preserved() {
        let catalog = two_action_catalog();
        let mut state = LifecycleState::new();
        for id in ["B", "A"] {
            state = offer(&state, &catalog, id).expect("accepted");
            state = state.start(id).expect("start").state;
            state = state.complete(&catalog, id).expect("complete").state;
        }
        assert_eq!(state.completed(), [ActionId::new("B"), ActionId::new("A")]);
    }
}
