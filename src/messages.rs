use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

pub const EMAIL_REGISTERED: &str = "emailRegistered";
pub const NAME_REQUIRED: &str = "nameRequired";
pub const INVALID_EMAIL: &str = "invalidEmail";
pub const PASSWORD_TOO_SHORT: &str = "passwordTooShort";
pub const USER_NOT_FOUND: &str = "userNotFound";

/// User-facing texts looked up by key.
#[derive(Debug, Clone)]
pub struct Messages {
    entries: HashMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        let entries = [
            (EMAIL_REGISTERED, "Email already registered"),
            (NAME_REQUIRED, "Name is required"),
            (INVALID_EMAIL, "Invalid email"),
            (PASSWORD_TOO_SHORT, "Password must have at least 6 characters"),
            (USER_NOT_FOUND, "User not found"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { entries }
    }
}

impl Messages {
    /// Built-in catalog with the entries of a JSON object file laid over it.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read message catalog {}", path.display()))?;
        let overrides: HashMap<String, String> =
            serde_json::from_str(&raw).context("parse message catalog")?;
        debug!(count = overrides.len(), path = %path.display(), "message overrides loaded");
        Ok(overrides
            .into_iter()
            .fold(Self::default(), |m, (k, v)| m.with(k, v)))
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    /// Unknown keys resolve to the key itself.
    pub fn get(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(text) => text.clone(),
            None => {
                warn!(key, "missing message key");
                key.to_string()
            }
        }
    }

    pub fn email_registered(&self) -> String {
        self.get(EMAIL_REGISTERED)
    }
}
