use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::MessageResult;

/// Answers which messages declare a mixin.
///
/// `mixin` is a mixin curie-major (`vendor:package:mixin:name:v1`) and the
/// answer is the curie-majors of every message using it.
#[async_trait]
pub trait ManifestResolver: Send + Sync {
    async fn resolve(&self, mixin: &str) -> MessageResult<Vec<String>>;
}

/// In-memory manifest, typically built from generated code.
#[derive(Debug, Clone, Default)]
pub struct StaticManifest {
    entries: HashMap<String, Vec<String>>,
}

impl StaticManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mixin: &str, messages: &[&str]) -> Self {
        self.insert(mixin, messages.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn insert(&mut self, mixin: &str, messages: Vec<String>) {
        self.entries.insert(mixin.to_string(), messages);
    }
}

#[async_trait]
impl ManifestResolver for StaticManifest {
    async fn resolve(&self, mixin: &str) -> MessageResult<Vec<String>> {
        Ok(self.entries.get(mixin).cloned().unwrap_or_default())
    }
}
