//! HTTP client for the SHAE reply service.
//!
//! Pure transport: request/response types for `/chat` and `/health`, plus the
//! `ReplySource` seam the chat session talks to.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, ReplySource, ShaeClient};
pub use error::{ApiError, Result};
pub use types::{
    ChatRequest, ChatResponse, ConversationMode, HealthResponse, MICRO_ACTION_KIND,
    OrchestrationResult, RiskFlags, RouteStage, SafetyResult, Severity, UiAction,
};
