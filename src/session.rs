//! Session credentials (bearer token + username) shared with the login flow.
//!
//! Stores are read on every API call; nothing here caches a snapshot.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

const DEFAULT_SESSION_FILE: &str = ".cinecatalog-session.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user.into()),
        }
    }

    /// Pulls `token` and `user.Username` out of a `POST /login` response.
    pub fn from_login_response(body: &Value) -> Option<Self> {
        let token = body.get("token").and_then(|v| v.as_str())?;
        let user = body
            .get("user")
            .and_then(|u| u.get("Username"))
            .and_then(|v| v.as_str())?;
        Some(Self::new(token, user))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.is_empty())
    }
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Credentials>;
    fn save(&self, credentials: &Credentials) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file holding `{"token": ..., "user": ...}`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        let path = env::var("CATALOG_SESSION_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Credentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Credentials::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read session file {:?}", self.path))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Credentials::default());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Session file {:?} is not valid JSON", self.path))
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session directory {:?}", parent))?;
        }
        let body = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, body)
            .with_context(|| format!("Failed to write session file {:?}", self.path))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove session file {:?}", self.path))
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Credentials>,
}

impl MemorySessionStore {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Credentials::new(token, user)),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.token = Some(token.into());
    }

    pub fn set_user(&self, user: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.user = Some(user.into());
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Credentials> {
        Ok(self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = credentials.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Credentials::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_token_and_username_from_login_response() {
        let body = json!({
            "user": { "_id": "u1", "Username": "trinity", "Email": "t@zion.io" },
            "token": "abc.def.ghi"
        });
        let creds = Credentials::from_login_response(&body).expect("credentials");
        assert_eq!(creds.token(), Some("abc.def.ghi"));
        assert_eq!(creds.user(), Some("trinity"));

        assert!(Credentials::from_login_response(&json!({ "token": "x" })).is_none());
        assert!(Credentials::from_login_response(&json!({})).is_none());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let creds = Credentials::new("", "");
        assert_eq!(creds.token(), None);
        assert_eq!(creds.user(), None);
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().expect("load missing"), Credentials::default());

        store
            .save(&Credentials::new("tok-1", "morpheus"))
            .expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded.token(), Some("tok-1"));
        assert_eq!(loaded.user(), Some("morpheus"));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load cleared"), Credentials::default());
        store.clear().expect("clearing twice is fine");
    }

    #[test]
    fn file_store_sees_external_rewrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);
        store.save(&Credentials::new("old", "neo")).expect("save");

        fs::write(&path, r#"{"token":"new","user":"neo"}"#).expect("external write");
        assert_eq!(store.load().expect("load").token(), Some("new"));
    }

    #[test]
    fn memory_store_updates_are_visible_to_next_load() {
        let store = MemorySessionStore::new("first", "neo");
        assert_eq!(store.load().unwrap().token(), Some("first"));
        store.set_token("second");
        assert_eq!(store.load().unwrap().token(), Some("second"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap().token(), None);
    }
}
