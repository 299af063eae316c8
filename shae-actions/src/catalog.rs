use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ActionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for ActionId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the guided exercise attached to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Stabilize,
    Release,
    Reflect,
    Process,
    Activate,
}

impl ActionCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stabilize => "STABILIZE",
            Self::Release => "RELEASE",
            Self::Reflect => "REFLECT",
            Self::Process => "PROCESS",
            Self::Activate => "ACTIVATE",
        }
    }

    pub fn is_timed(self) -> bool {
        matches!(self, Self::Stabilize | Self::Activate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroAction {
    pub id: ActionId,
    pub category: ActionCategory,
    pub title: String,
    pub description: String,
    pub duration_seconds: Option<u32>,
    /// Show the "not saved" notice before the user engages.
    pub requires_consent_notice: bool,
}

impl MicroAction {
    pub const CONSENT_NOTICE: &'static str = "This won't be saved unless you choose.";

    /// "45 seconds" / "2 minutes", matching the suggestion card.
    pub fn duration_label(&self) -> Option<String> {
        let secs = self.duration_seconds?;
        if secs < 60 {
            Some(format!("{secs} seconds"))
        } else {
            Some(format!("{} minutes", secs / 60))
        }
    }
}

/// Ordered, immutable registry of the actions this client can run.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    actions: Vec<MicroAction>,
}

impl ActionCatalog {
    pub fn new(actions: Vec<MicroAction>) -> Result<Self, CatalogError> {
        for (idx, action) in actions.iter().enumerate() {
            if action.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if actions[..idx].iter().any(|a| a.id == action.id) {
                return Err(CatalogError::DuplicateId(action.id.clone()));
            }
        }
        Ok(Self { actions })
    }

    /// Actions shared with the reply service's allowed id list.
    pub fn builtin() -> Self {
        Self {
            actions: vec![
                MicroAction {
                    id: ActionId::new("square_breathing"),
                    category: ActionCategory::Stabilize,
                    title: "Square Breathing".to_string(),
                    description: "A calming 4-4-4-4 breath pattern to ground yourself right now."
                        .to_string(),
                    duration_seconds: Some(60),
                    requires_consent_notice: false,
                },
                MicroAction {
                    id: ActionId::new("burn_journaling"),
                    category: ActionCategory::Release,
                    title: "Burn Journaling".to_string(),
                    description:
                        "Write what's weighing on you, then let it go—no saving, no holding on."
                            .to_string(),
                    duration_seconds: None,
                    requires_consent_notice: true,
                },
                MicroAction {
                    id: ActionId::new("two_minute_rule"),
                    category: ActionCategory::Activate,
                    title: "2-Minute Rule".to_string(),
                    description: "Pick one small thing. Just start. Momentum will follow."
                        .to_string(),
                    duration_seconds: Some(120),
                    requires_consent_notice: false,
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&MicroAction> {
        self.actions.iter().find(|a| a.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MicroAction> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
