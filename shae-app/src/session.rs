//! Session identity store.
//!
//! One opaque id under a fixed key in a small JSON key-value file, reused
//! until the user resets their data.

use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SESSION_KEY: &str = "shae_session_id";
const STORE_FILE: &str = "local_storage.json";
const SUFFIX_LEN: usize = 7;

type Entries = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Result<Option<String>> {
        let entries = self.read_entries().await?.unwrap_or_default();
        Ok(entries
            .get(SESSION_KEY)
            .and_then(serde_json::Value::as_str)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string))
    }

    /// An unreadable or mistyped stored value is replaced with a fresh id.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn get_or_create(&self) -> Result<String> {
        if let Some(existing) = self.get().await? {
            return Ok(existing);
        }
        let id = generate_session_id();
        self.set(&id).await?;
        tracing::info!(session_id = %id, "created new session id");
        Ok(id)
    }

    pub async fn set(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(anyhow::anyhow!("session id must not be empty"));
        }
        let mut entries = self.read_entries().await?.unwrap_or_default();
        entries.insert(
            SESSION_KEY.to_string(),
            serde_json::Value::String(session_id.to_string()),
        );
        self.write_entries(&entries).await
    }

    /// Returns whether anything was removed. An unreadable store file is
    /// deleted outright.
    pub async fn clear(&self) -> Result<bool> {
        let Some(mut entries) = self.read_entries().await? else {
            tokio::fs::remove_file(&self.path)
                .await
                .map_err(|e| anyhow::anyhow!("remove {}: {e}", self.path.display()))?;
            return Ok(true);
        };
        let removed = entries.remove(SESSION_KEY).is_some();
        if removed {
            self.write_entries(&entries).await?;
        }
        Ok(removed)
    }

    /// `Ok(None)` when the file exists but is not a JSON object.
    async fn read_entries(&self) -> Result<Option<Entries>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Some(Entries::new())),
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => Ok(Some(entries)),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        %e,
                        "ignoring unreadable session store"
                    );
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Some(Entries::new())),
            Err(e) => Err(anyhow::anyhow!("read {}: {e}", self.path.display())),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("create data dir {}: {e}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| anyhow::anyhow!("write {}: {e}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| anyhow::anyhow!("replace {}: {e}", self.path.display()))?;
        Ok(())
    }
}

/// `session_<unix_ms>_<7 base36 chars>`
pub fn generate_session_id() -> String {
    format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

fn random_suffix() -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}
