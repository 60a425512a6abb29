use async_trait::async_trait;
use config::ConfigError;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::auth::AuthProvider;
use crate::config::AuthConfig;
use crate::error::RelayError;

/// Identity Toolkit REST API (Firebase Authentication)
pub struct IdentityToolkitProvider {
    client: Client,
    base_url: String,
    api_key: String,
    project_id: String,
    access_token: String,
}

impl IdentityToolkitProvider {
    pub fn new(config: &AuthConfig) -> Result<Self, RelayError> {
        // Try config first, then fall back to environment variables
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("FIREBASE_API_KEY").ok())
            .ok_or_else(|| {
                ConfigError::Message("FIREBASE_API_KEY not found in config or environment".into())
            })?;
        let access_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var("GOOGLE_ACCESS_TOKEN").ok())
            .ok_or_else(|| {
                ConfigError::Message(
                    "GOOGLE_ACCESS_TOKEN not found in config or environment".into(),
                )
            })?;

        Ok(IdentityToolkitProvider {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            project_id: config.project_id.clone(),
            access_token,
        })
    }

    /// POST a JSON body and return the parsed response, mapping any
    /// non-success status to an auth failure
    async fn post(
        &self,
        request: reqwest::RequestBuilder,
        body: Value,
    ) -> Result<Value, RelayError> {
        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::AuthError(e.to_string()))?;

        let status = response.status();
        let response_body: Value = response.json().await.unwrap_or(Value::Null);
        debug!("{:?}", response_body);

        if !status.is_success() {
            let reason = response_body["error"]["message"]
                .as_str()
                .unwrap_or("no error message");
            return Err(RelayError::AuthError(format!("{status}: {reason}")));
        }

        Ok(response_body)
    }

    async fn update_account(&self, update: Value) -> Result<(), RelayError> {
        let url = format!(
            "{}/v1/projects/{}/accounts:update",
            self.base_url, self.project_id
        );
        let request = self.client.post(url).bearer_auth(&self.access_token);
        self.post(request, update).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitProvider {
    fn provider_name(&self) -> &str {
        "identity_toolkit"
    }

    async fn verify_token(&self, id_token: &str) -> Result<String, RelayError> {
        let url = format!("{}/v1/accounts:lookup", self.base_url);
        let request = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())]);

        let response_body = self.post(request, json!({ "idToken": id_token })).await?;

        let uid = response_body["users"][0]["localId"]
            .as_str()
            .ok_or_else(|| RelayError::AuthError("ID token does not belong to any user".into()))?
            .to_string();

        Ok(uid)
    }

    async fn update_password(&self, uid: &str, password: &str) -> Result<(), RelayError> {
        self.update_account(json!({ "localId": uid, "password": password }))
            .await?;
        info!("Password updated for user {}", uid);
        Ok(())
    }

    async fn mark_email_verified(&self, uid: &str) -> Result<(), RelayError> {
        self.update_account(json!({ "localId": uid, "emailVerified": true }))
            .await?;
        info!("Email verified for user {}", uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(base_url: String) -> AuthConfig {
        AuthConfig {
            api_key: Some("web-key".to_string()),
            project_id: "demo".to_string(),
            access_token: Some("admin-token".to_string()),
            base_url,
        }
    }

    #[tokio::test]
    async fn test_verify_token_returns_local_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/accounts:lookup")
            .match_query(Matcher::UrlEncoded("key".into(), "web-key".into()))
            .match_body(Matcher::Json(json!({ "idToken": "id-123" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"users": [{"localId": "user-42", "email": "a@example.com"}]}"#)
            .create_async()
            .await;

        let provider = IdentityToolkitProvider::new(&config(server.url())).unwrap();
        assert_eq!(provider.verify_token("id-123").await.unwrap(), "user-42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_token_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/accounts:lookup")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "INVALID_ID_TOKEN"}}"#)
            .create_async()
            .await;

        let provider = IdentityToolkitProvider::new(&config(server.url())).unwrap();
        let err = provider.verify_token("bogus").await.unwrap_err();
        assert!(matches!(err, RelayError::AuthError(_)));
        assert!(err.to_string().contains("INVALID_ID_TOKEN"));
    }

    #[tokio::test]
    async fn test_mark_email_verified_sends_admin_update() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/projects/demo/accounts:update")
            .match_header("authorization", "Bearer admin-token")
            .match_body(Matcher::Json(json!({ "localId": "user-42", "emailVerified": true })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"localId": "user-42"}"#)
            .create_async()
            .await;

        let provider = IdentityToolkitProvider::new(&config(server.url())).unwrap();
        provider.mark_email_verified("user-42").await.unwrap();
        mock.assert_async().await;
    }
}
