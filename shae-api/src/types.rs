use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `type` tag carried by every micro-action UI hint.
pub const MICRO_ACTION_KIND: &str = "micro_action";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Safe,
    Distressed,
    Crisis,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlags {
    #[serde(default)]
    pub self_harm: bool,
    #[serde(default)]
    pub suicide: bool,
    #[serde(default)]
    pub harm_others: bool,
    #[serde(default)]
    pub abuse: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyResult {
    pub severity: Severity,
    /// 0..=10.
    pub distress_score: u8,
    #[serde(default)]
    pub risk: RiskFlags,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    Listen,
    Reflect,
    Act,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStage {
    Negative,
    Neutral,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub distress_score: u8,
    pub mode: ConversationMode,
    pub route: Vec<RouteStage>,
    pub allow_positive: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub signals: BTreeMap<String, f64>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Suggestion hint attached to a reply. Only `kind` and `id` drive local behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub deeplink: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl UiAction {
    pub fn is_micro_action(&self) -> bool {
        self.kind == MICRO_ACTION_KIND
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub safety: SafetyResult,
    #[serde(default)]
    pub orchestration: Option<OrchestrationResult>,
    pub reply: String,
    #[serde(default)]
    pub ui_actions: Option<Vec<UiAction>>,
    #[serde(default)]
    pub debug: Option<serde_json::Value>,
    #[serde(default)]
    pub route_why: Option<String>,
}

impl ChatResponse {
    pub fn ui_actions(&self) -> &[UiAction] {
        self.ui_actions.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub ok: bool,
}
