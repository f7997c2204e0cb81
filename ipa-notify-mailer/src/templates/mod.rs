mod engine;
mod notify_templates;

pub use engine::{AskamaTemplateEngine, LOCKED_USERS, PASSWORD_EXPIRATION, TemplateEngine};
pub use notify_templates::{
    LockedUserLine, LockedUsersHtmlTemplate, LockedUsersTemplate, PasswordExpirationHtmlTemplate,
    PasswordExpirationTemplate,
};

use crate::MailerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Loosely typed template arguments, decoded by each template's `from_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateData {
    pub data: HashMap<String, serde_json::Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn insert<T: Serialize>(mut self, key: &str, value: T) -> Result<Self, MailerError> {
        self.data
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub(crate) fn require_str(&self, key: &str) -> Result<String, MailerError> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| MailerError::Builder(format!("{key} is required")))
    }

    pub(crate) fn require<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<T, MailerError> {
        let value = self
            .get(key)
            .ok_or_else(|| MailerError::Builder(format!("{key} is required")))?;
        Ok(serde_json::from_value(value.clone())?)
    }
}

impl Default for TemplateData {
    fn default() -> Self {
        Self::new()
    }
}
