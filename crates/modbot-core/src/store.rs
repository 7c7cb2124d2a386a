//! Durable moderation state: the managed chats and the global ban list.
//!
//! The whole state is one small JSON document. Every mutation is persisted
//! before it becomes visible in memory, and all access goes through a single
//! lock. Nothing coordinates between processes sharing the same file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{domain::ChatId, errors::Error, Result};

/// On-disk shape: `{"managed_chats": [...], "global_bans": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModState {
    pub managed_chats: Vec<ChatId>,
    pub global_bans: Vec<String>,
}

pub struct StateStore {
    path: PathBuf,
    state: Mutex<ModState>,
}

impl StateStore {
    /// Load the backing file (or start empty if it does not exist).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state_file(&path)?;
        tracing::info!(
            path = %path.display(),
            managed_chats = state.managed_chats.len(),
            global_bans = state.global_bans.len(),
            "moderation state loaded"
        );
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> ModState {
        self.state.lock().await.clone()
    }

    pub async fn managed_chats(&self) -> Vec<ChatId> {
        self.state.lock().await.managed_chats.clone()
    }

    pub async fn global_bans(&self) -> Vec<String> {
        self.state.lock().await.global_bans.clone()
    }

    /// Append `chat` to the managed set. Returns `false` if it was already present.
    pub async fn register_chat(&self, chat: ChatId) -> Result<bool> {
        self.mutate(|s| {
            if s.managed_chats.contains(&chat) {
                return false;
            }
            s.managed_chats.push(chat);
            true
        })
        .await
    }

    /// Remove `chat` from the managed set. Returns `false` if it was not present.
    pub async fn unregister_chat(&self, chat: ChatId) -> Result<bool> {
        self.mutate(|s| remove_first(&mut s.managed_chats, &chat))
            .await
    }

    /// Record a global ban keyed by the raw target string. Returns `false` on a repeat.
    pub async fn add_global_ban(&self, raw: &str) -> Result<bool> {
        self.mutate(|s| {
            if s.global_bans.iter().any(|b| b == raw) {
                return false;
            }
            s.global_bans.push(raw.to_string());
            true
        })
        .await
    }

    /// Drop a global ban. Returns `false` if `raw` was not banned.
    pub async fn remove_global_ban(&self, raw: &str) -> Result<bool> {
        self.mutate(|s| remove_first(&mut s.global_bans, &raw.to_string()))
            .await
    }

    /// Apply `f` to a copy of the state; if it reports a change, persist the
    /// copy and only then make it the in-memory state.
    async fn mutate(&self, f: impl FnOnce(&mut ModState) -> bool) -> Result<bool> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        if !f(&mut next) {
            return Ok(false);
        }
        save_state_file(&self.path, &next)?;
        *guard = next;
        tracing::debug!(path = %self.path.display(), "moderation state persisted");
        Ok(true)
    }
}

fn remove_first<T: PartialEq>(items: &mut Vec<T>, item: &T) -> bool {
    match items.iter().position(|x| x == item) {
        Some(idx) => {
            items.remove(idx);
            true
        }
        None => false,
    }
}

pub fn load_state_file(path: &Path) -> Result<ModState> {
    if !path.exists() {
        return Ok(ModState::default());
    }
    let txt = std::fs::read_to_string(path).map_err(|e| storage_error(path, e))?;
    serde_json::from_str(&txt).map_err(|e| storage_error(path, e))
}

pub fn save_state_file(path: &Path, state: &ModState) -> Result<()> {
    let mut txt = serde_json::to_string_pretty(state)?;
    txt.push('\n');
    write_atomic(path, txt.as_bytes()).map_err(|e| storage_error(path, e))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::Storage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
