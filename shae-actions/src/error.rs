use crate::catalog::ActionId;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate action id: {0}")]
    DuplicateId(ActionId),

    #[error("action id must not be empty")]
    EmptyId,
}

/// Why a suggestion was not accepted. Callers drop these silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("unknown action id: {0}")]
    UnknownAction(ActionId),

    #[error("action already completed this session: {0}")]
    AlreadyCompleted(ActionId),

    #[error("another action is already {state}: {current}")]
    Busy {
        state: &'static str,
        current: ActionId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    Skip,
    Complete,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Skip => "skip",
            Self::Complete => "complete",
        })
    }
}

/// A start/skip/complete that does not match the current pending or active action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {event} {action_id}: pending={pending:?} active={active:?}")]
pub struct InvalidTransition {
    pub event: LifecycleEvent,
    pub action_id: ActionId,
    pub pending: Option<ActionId>,
    pub active: Option<ActionId>,
}
