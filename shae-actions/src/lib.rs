//! Micro-action suggestion lifecycle for SHAE chat sessions.
//!
//! The catalog, gate and lifecycle are pure data and functions; the exercise
//! widgets own cancellable tokio timers and must be created inside a runtime.

mod catalog;
mod error;
pub mod exercise;
mod gate;
mod lifecycle;
mod timer;
mod transcript;

pub use catalog::{ActionCatalog, ActionCategory, ActionId, MicroAction};
pub use error::{CatalogError, InvalidTransition, LifecycleEvent, Rejected};
pub use exercise::Exercise;
pub use gate::{SuggestionGate, SuggestionSignal, UnknownIdPolicy};
pub use lifecycle::{
    COMPLETION_AFFIRMATION, Delay, Effect, LifecycleState, Phase, SKIP_ACKNOWLEDGEMENT,
    Transition, completion_notice,
};
pub use timer::{TickControl, TimerHandle, spawn_ticker};
pub use transcript::{GREETING, Sender, Transcript, TranscriptEntry};
