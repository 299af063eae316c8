//! Chat session runtime.
//!
//! Owns one session's transcript, lifecycle state and running exercise, and
//! wires reply source -> suggestion gate -> lifecycle -> transcript.

use crate::config::{AppEnv, PacingConfig};
use shae_actions::{
    ActionCatalog, ActionId, Effect, Exercise, InvalidTransition, LifecycleState, MicroAction,
    Sender, SuggestionGate, Transcript, Transition, UnknownIdPolicy,
};
use shae_api::ReplySource;
use std::sync::Arc;

pub const CONNECTION_APOLOGY: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Replied { suggestion: Option<ActionId> },
    /// The reply source failed; an apology was appended instead.
    Failed,
}

pub struct ChatSession {
    session_id: String,
    replies: Arc<dyn ReplySource>,
    catalog: ActionCatalog,
    unknown_ids: UnknownIdPolicy,
    pacing: PacingConfig,
    transcript: Transcript,
    lifecycle: LifecycleState,
    exercise: Option<Exercise>,
}

impl ChatSession {
    pub fn new(
        session_id: impl Into<String>,
        replies: Arc<dyn ReplySource>,
        catalog: ActionCatalog,
        app_env: AppEnv,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            replies,
            catalog,
            unknown_ids: app_env.unknown_id_policy(),
            pacing,
            transcript: Transcript::with_greeting(),
            lifecycle: LifecycleState::new(),
            exercise: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    pub fn suggested_action(&self) -> Option<&MicroAction> {
        self.lifecycle.pending().and_then(|id| self.catalog.get(id))
    }

    pub fn active_action(&self) -> Option<&MicroAction> {
        self.lifecycle.active().and_then(|id| self.catalog.get(id))
    }

    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    pub fn exercise_mut(&mut self) -> Option<&mut Exercise> {
        self.exercise.as_mut()
    }

    #[tracing::instrument(level = "info", skip_all, fields(session_id = %self.session_id))]
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        self.transcript.append(Sender::User, text);

        let response = match self.replies.send_message(&self.session_id, text).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%e, "reply source failed");
                self.transcript.append(Sender::Companion, CONNECTION_APOLOGY);
                return SendOutcome::Failed;
            }
        };
        self.transcript.append(Sender::Companion, response.reply.as_str());

        let gate = SuggestionGate::new(&self.catalog, self.unknown_ids);
        let Some(signal) = gate.evaluate(response.ui_actions()) else {
            return SendOutcome::Replied { suggestion: None };
        };
        match self.lifecycle.offer_suggestion(&self.catalog, &signal) {
            Ok(transition) => {
                tracing::info!(action_id = %signal.action_id, "micro-action suggested");
                self.apply(transition).await;
                SendOutcome::Replied {
                    suggestion: Some(signal.action_id),
                }
            }
            Err(rejected) => {
                tracing::debug!(%rejected, "suggestion dropped");
                SendOutcome::Replied { suggestion: None }
            }
        }
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn start(&mut self, action_id: &str) -> Result<(), InvalidTransition> {
        let transition = self.lifecycle.start(action_id)?;
        self.stop_exercise();
        self.exercise = self.catalog.get(action_id).and_then(Exercise::start_for);
        self.apply(transition).await;
        Ok(())
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn skip(&mut self, action_id: &str) -> Result<(), InvalidTransition> {
        let transition = self.lifecycle.skip(action_id)?;
        self.stop_exercise();
        self.apply(transition).await;
        Ok(())
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn complete(&mut self, action_id: &str) -> Result<(), InvalidTransition> {
        let transition = self.lifecycle.complete(&self.catalog, action_id)?;
        self.stop_exercise();
        self.apply(transition).await;
        Ok(())
    }

    /// Starts over under a new session id: fresh transcript and lifecycle.
    pub fn reset(&mut self, session_id: impl Into<String>) {
        self.stop_exercise();
        self.session_id = session_id.into();
        self.transcript = Transcript::with_greeting();
        self.lifecycle = LifecycleState::new();
    }

    fn stop_exercise(&mut self) {
        if let Some(mut exercise) = self.exercise.take() {
            exercise.cancel();
        }
    }

    /// Commits the state, then plays effects in order with their pacing delays.
    async fn apply(&mut self, transition: Transition) {
        let Transition { state, effects } = transition;
        self.lifecycle = state;
        for effect in effects {
            match effect {
                Effect::Append {
                    sender,
                    text,
                    delay,
                } => {
                    let wait = self.pacing.delay(delay);
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                    self.transcript.append(sender, text);
                }
            }
        }
    }
}
