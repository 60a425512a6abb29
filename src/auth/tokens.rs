use async_trait::async_trait;
use config::ConfigError;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::auth::TokenRegistry;
use crate::config::TokenRegistryConfig;
use crate::error::RelayError;

/// Process-local token store for embedding and tests; a server cannot
/// fill it, so the confirm-email route refuses to start on it
#[derive(Debug, Default)]
pub struct InMemoryTokenRegistry {
    tokens: Mutex<HashMap<String, String>>,
}

impl InMemoryTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, token: impl Into<String>, uid: impl Into<String>) {
        self.tokens.lock().await.insert(token.into(), uid.into());
    }
}

#[async_trait]
impl TokenRegistry for InMemoryTokenRegistry {
    async fn lookup(&self, token: &str) -> Result<Option<String>, RelayError> {
        Ok(self.tokens.lock().await.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<(), RelayError> {
        self.tokens.lock().await.remove(token);
        Ok(())
    }
}

/// Tokens stored as Firestore documents named after the token, with the
/// owning user in a `uid` string field
pub struct FirestoreTokenRegistry {
    client: Client,
    collection_url: Url,
    access_token: String,
}

/// A token must name exactly one document inside the collection
fn is_document_id(token: &str) -> bool {
    !token.is_empty()
        && token != "."
        && token != ".."
        && !token.contains(['/', '\\'])
}

impl FirestoreTokenRegistry {
    pub fn new(
        config: &TokenRegistryConfig,
        fallback_project: Option<&str>,
    ) -> Result<Self, RelayError> {
        let project_id = config
            .project_id
            .as_deref()
            .or(fallback_project)
            .ok_or_else(|| ConfigError::NotFound("tokens.project_id".to_string()))?;

        let access_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var("GOOGLE_ACCESS_TOKEN").ok())
            .ok_or_else(|| {
                ConfigError::Message(
                    "GOOGLE_ACCESS_TOKEN not found in config or environment".into(),
                )
            })?;

        let collection_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            config.base_url.trim_end_matches('/'),
            project_id,
            config.collection
        );
        let collection_url = Url::parse(&collection_url).map_err(|e| {
            ConfigError::Message(format!("invalid token registry URL {collection_url}: {e}"))
        })?;
        if collection_url.cannot_be_a_base() {
            return Err(ConfigError::Message(format!(
                "token registry URL {collection_url} cannot hold documents"
            ))
            .into());
        }

        Ok(FirestoreTokenRegistry {
            client: Client::new(),
            collection_url,
            access_token,
        })
    }

    /// URL of the document for `token`, percent-encoded as a single path
    /// segment. `None` for tokens that could address another document.
    fn document_url(&self, token: &str) -> Option<Url> {
        if !is_document_id(token) {
            return None;
        }
        let mut url = self.collection_url.clone();
        url.path_segments_mut().ok()?.push(token);
        Some(url)
    }

    fn check(status: StatusCode, action: &str) -> Result<(), RelayError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(RelayError::TokenRegistryError(format!(
                "{action} returned {status}"
            )))
        }
    }
}

#[async_trait]
impl TokenRegistry for FirestoreTokenRegistry {
    async fn lookup(&self, token: &str) -> Result<Option<String>, RelayError> {
        let Some(document_url) = self.document_url(token) else {
            warn!("Rejected malformed confirmation token");
            return Ok(None);
        };

        let response = self
            .client
            .get(document_url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| RelayError::TokenRegistryError(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Token not found in registry");
            return Ok(None);
        }
        Self::check(response.status(), "Token lookup")?;

        let document: Value = response
            .json()
            .await
            .map_err(|e| RelayError::TokenRegistryError(e.to_string()))?;

        let Some(uid) = document["fields"]["uid"]["stringValue"].as_str() else {
            warn!("Token document has no uid field");
            return Ok(None);
        };

        Ok(Some(uid.to_string()))
    }

    async fn remove(&self, token: &str) -> Result<(), RelayError> {
        let Some(document_url) = self.document_url(token) else {
            return Ok(());
        };

        let response = self
            .client
            .delete(document_url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| RelayError::TokenRegistryError(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response.status(), "Token delete")
    }
}
