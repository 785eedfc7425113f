//! File-backed session storage.
//!
//! The browser build of this product kept the token, the user identity and
//! the chat transcript in local storage. Here the same keys live as JSON
//! files inside a per-user data directory: `session.json` for the identity
//! and `ai_chat_history.json` for the cached assistant transcript.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::{ChatMessage, Session};

const SESSION_FILE: &str = "session.json";
const CHAT_FILE: &str = "ai_chat_history.json";

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Platform data directory for the app (e.g. `~/.local/share/finscope`).
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().context("Cannot determine platform data directory")?;
        Ok(base.join("finscope"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn chat_path(&self) -> PathBuf {
        self.dir.join(CHAT_FILE)
    }

    /// Loads the stored session. Absent or unreadable files both mean "not
    /// logged in"; a corrupt session is never an error worth surfacing.
    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(self.session_path()).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Creating data directory {}", self.dir.display()))?;
        let json = serde_json::to_string_pretty(session)?;
        fs::write(self.session_path(), json)
            .with_context(|| format!("Writing {}", self.session_path().display()))?;
        Ok(())
    }

    /// Logout / 401 handling: removes every stored key, transcript included.
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.session_path())?;
        remove_if_exists(&self.chat_path())?;
        Ok(())
    }

    /// Cached chat transcript. Tolerant on purpose: a missing or corrupt
    /// cache starts an empty conversation.
    pub fn load_chat(&self) -> Vec<ChatMessage> {
        fs::read_to_string(self.chat_path())
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save_chat(&self, messages: &[ChatMessage]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Creating data directory {}", self.dir.display()))?;
        let json = serde_json::to_string(messages)?;
        fs::write(self.chat_path(), json)
            .with_context(|| format!("Writing {}", self.chat_path().display()))?;
        Ok(())
    }

    pub fn clear_chat(&self) -> Result<()> {
        remove_if_exists(&self.chat_path())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Removing {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::ChatRole;

    fn sample_session() -> Session {
        Session {
            token: "header.payload.sig".to_string(),
            user_email: "marcelo@demo.com".to_string(),
            full_name: "Marcelo Demo".to_string(),
        }
    }

    #[test]
    fn test_session_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path());

        assert!(store.load().is_none());
        store.save(&sample_session()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.user_email, "marcelo@demo.com");
        assert_eq!(loaded.full_name, "Marcelo Demo");
    }

    #[test]
    fn test_clear_removes_session_and_transcript() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path());

        store.save(&sample_session()).unwrap();
        store
            .save_chat(&[ChatMessage {
                role: ChatRole::User,
                text: "¿Cómo van mis ahorros?".to_string(),
            }])
            .unwrap();

        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(store.load_chat().is_empty());

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_session_reads_as_logged_out() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path());

        fs::create_dir_all(tmp.path()).unwrap();
        fs::write(tmp.path().join(SESSION_FILE), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_chat_transcript_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path());

        let messages = vec![
            ChatMessage {
                role: ChatRole::User,
                text: "hola".to_string(),
            },
            ChatMessage {
                role: ChatRole::Ai,
                text: "¿En qué puedo ayudarte?".to_string(),
            },
        ];
        store.save_chat(&messages).unwrap();

        let loaded = store.load_chat();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].role, ChatRole::Ai);

        store.clear_chat().unwrap();
        assert!(store.load_chat().is_empty());
    }
}
