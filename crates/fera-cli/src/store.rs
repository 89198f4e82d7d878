//! Durable search history store
//!
//! The whole [`SearchHistory`] is persisted as one JSON blob under the data
//! directory and rewritten wholesale on every mutation. An unreadable or
//! corrupt blob starts an empty history rather than failing.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use fera::{SearchHistory, Source};

const DATA_DIR: &str = "fera";
const HISTORY_FILE: &str = "history.json";

pub struct HistoryStore {
    path: PathBuf,
    history: SearchHistory,
}

impl HistoryStore {
    /// Default blob location: `<data dir>/fera/history.json`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::data_dir()
            .context("Could not determine data directory")?
            .join(DATA_DIR);
        Ok(dir.join(HISTORY_FILE))
    }

    /// Open the store at `path`, loading what is there. Missing or corrupt
    /// blobs yield an empty history.
    pub fn open(path: PathBuf) -> Self {
        let history = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, history }
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Create a session, make it current, persist. Returns the session id.
    pub fn create_session(
        &mut self,
        query: &str,
        response: &str,
        sources: Vec<Source>,
    ) -> Result<String> {
        let id = self.history.create_session(query, response, sources);
        self.save()?;
        Ok(id)
    }

    /// Append a follow-up turn to a session and persist.
    pub fn add_to_session(
        &mut self,
        session_id: &str,
        query: &str,
        response: &str,
        sources: Vec<Source>,
    ) -> Result<bool> {
        let added = self.history.add_to_session(session_id, query, response, sources);
        if added {
            self.save()?;
        }
        Ok(added)
    }

    pub fn set_current_session(&mut self, session_id: Option<String>) -> Result<()> {
        self.history.set_current_session(session_id);
        self.save()
    }

    pub fn delete_session(&mut self, session_id: &str) -> Result<bool> {
        let deleted = self.history.delete_session(session_id);
        if deleted {
            self.save()?;
        }
        Ok(deleted)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.history.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }
        let content =
            serde_json::to_string_pretty(&self.history).context("Failed to serialize history")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history to {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json"));
        assert!(store.history().sessions.is_empty());
    }

    #[test]
    fn test_mutations_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::open(path.clone());
        let id = store.create_session("capital of France", "Paris.", vec![]).unwrap();
        store.add_to_session(&id, "population?", "2.1 million.", vec![]).unwrap();

        let reopened = HistoryStore::open(path);
        let session = reopened.history().get_session(&id).unwrap();
        assert_eq!(session.conversations.len(), 2);
        assert_eq!(reopened.history().current_session_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_corrupt_blob_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        let store = HistoryStore::open(path);
        assert!(store.history().sessions.is_empty());
    }

    #[test]
    fn test_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut store = HistoryStore::open(path.clone());
        let id = store.create_session("q", "r", vec![]).unwrap();
        assert!(store.delete_session(&id).unwrap());

        let reopened = HistoryStore::open(path);
        assert!(reopened.history().sessions.is_empty());
        assert!(reopened.history().current_session_id.is_none());
    }
}
