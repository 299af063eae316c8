//! Guided exercises attached to catalog categories.
//!
//! Every widget owns its timer handle. Dropping or cancelling the exercise
//! stops the timer before any further tick can land.

mod breathing;
mod countdown;
mod release;

pub use breathing::{BreathPhase, Breathing, BreathingPattern, BreathingState};
pub use countdown::{Countdown, CountdownState, DEFAULT_COUNTDOWN_SECS};
pub use release::{BURN_DURATION, RELEASE_NOTICE, ReleasePad, ReleaseState};

use crate::catalog::{ActionCategory, ActionId, MicroAction};

pub enum ExerciseKind {
    Breathing(Breathing),
    Release(ReleasePad),
    Countdown(Countdown),
}

pub struct Exercise {
    action_id: ActionId,
    kind: ExerciseKind,
}

impl Exercise {
    /// Starts the widget for `action`. Must be called inside a tokio runtime.
    /// Categories without a widget yield `None`.
    pub fn start_for(action: &MicroAction) -> Option<Self> {
        let kind = match action.category {
            ActionCategory::Stabilize => {
                ExerciseKind::Breathing(Breathing::start(BreathingPattern::SQUARE))
            }
            ActionCategory::Release => ExerciseKind::Release(ReleasePad::new()),
            ActionCategory::Activate => ExerciseKind::Countdown(Countdown::start(
                action.duration_seconds.unwrap_or(DEFAULT_COUNTDOWN_SECS),
            )),
            ActionCategory::Reflect | ActionCategory::Process => return None,
        };
        tracing::debug!(action_id = %action.id, category = ?action.category, "exercise started");
        Some(Self {
            action_id: action.id.clone(),
            kind,
        })
    }

    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    pub fn kind(&self) -> &ExerciseKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ExerciseKind {
        &mut self.kind
    }

    /// The release pad never finishes on its own; the user decides.
    pub fn is_finished(&self) -> bool {
        match &self.kind {
            ExerciseKind::Breathing(b) => b.is_finished(),
            ExerciseKind::Release(_) => false,
            ExerciseKind::Countdown(c) => c.is_finished(),
        }
    }

    pub fn cancel(&mut self) {
        match &mut self.kind {
            ExerciseKind::Breathing(b) => b.cancel(),
            ExerciseKind::Release(r) => r.cancel(),
            ExerciseKind::Countdown(c) => c.cancel(),
        }
        tracing::debug!(action_id = %self.action_id, "exercise cancelled");
    }

    /// One-line progress summary.
    pub fn status_line(&self) -> String {
        match &self.kind {
            ExerciseKind::Breathing(b) => {
                let s = b.snapshot();
                if s.finished {
                    format!("{} · done", s.cycle_label())
                } else {
                    format!(
                        "{} · {} ({}s)",
                        s.cycle_label(),
                        s.phase.label(),
                        b.pattern().phase_secs
                    )
                }
            }
            ExerciseKind::Release(r) => {
                let s = r.snapshot();
                if s.burning {
                    "🔥 letting it go...".to_string()
                } else {
                    format!("{RELEASE_NOTICE} (released {} time(s))", s.burns)
                }
            }
            ExerciseKind::Countdown(c) => {
                let s = c.snapshot();
                if s.completed {
                    "✓ Nice!".to_string()
                } else {
                    format!("{} · Keep going", s.display())
                }
            }
        }
    }
}

impl Drop for Exercise {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn each_builtin_category_gets_its_widget() {
        let catalog = ActionCatalog::builtin();
        let breathing = Exercise::start_for(catalog.get("square_breathing").expect("present"))
            .expect("stabilize widget");
        assert!(matches!(breathing.kind(), ExerciseKind::Breathing(_)));
        assert_eq!(breathing.status_line(), "Cycle 1 of 4 · Breathe in (4s)");

        let release = Exercise::start_for(catalog.get("burn_journaling").expect("present"))
            .expect("release widget");
        assert!(matches!(release.kind(), ExerciseKind::Release(_)));
        assert!(!release.is_finished());

        let countdown = Exercise::start_for(catalog.get("two_minute_rule").expect("present"))
            .expect("activate widget");
        assert_eq!(countdown.status_line(), "2:00 · Keep going");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_exercise_stops_ticking() {
        let catalog = ActionCatalog::builtin();
        let mut exercise = Exercise::start_for(catalog.get("two_minute_rule").expect("present"))
            .expect("activate widget");
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        exercise.cancel();
        let before = exercise.status_line();
        assert_eq!(before, "1:58 · Keep going");

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(exercise.status_line(), before);
        assert!(!exercise.is_finished());
    }

    #[test]
    fn categories_without_widgets_yield_none() {
        let reflect = MicroAction {
            id: ActionId::new("fact_vs_story"),
            category: ActionCategory::Reflect,
            title: "Fact vs Story".to_string(),
            description: String::new(),
            duration_seconds: None,
            requires_consent_notice: false,
        };
        assert!(Exercise::start_for(&reflect).is_none());
    }
}
