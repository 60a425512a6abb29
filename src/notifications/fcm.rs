use async_trait::async_trait;
use config::ConfigError;
use log::debug;
use reqwest::Client;
use serde_json::{json, Map, Value};

use crate::config::NotificationConfig;
use crate::error::RelayError;
use crate::model::PushMessage;
use crate::notifications::NotificationProvider;

/// Firebase Cloud Messaging, HTTP v1 API
pub struct FcmProvider {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl FcmProvider {
    /// Create a new FCM provider from configuration
    pub fn new(config: &NotificationConfig) -> Result<Self, RelayError> {
        let project_id = config
            .project_id
            .as_deref()
            .ok_or_else(|| ConfigError::NotFound("notification.project_id".to_string()))?;

        // Try config first, then fall back to environment variable
        let access_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var("FCM_ACCESS_TOKEN").ok())
            .ok_or_else(|| {
                ConfigError::Message(
                    "FCM_ACCESS_TOKEN not found in config or environment".to_string(),
                )
            })?;

        Ok(FcmProvider {
            client: Client::new(),
            endpoint: format!(
                "{}/v1/projects/{}/messages:send",
                config.base_url.trim_end_matches('/'),
                project_id
            ),
            access_token,
        })
    }
}

/// Request body for `messages:send`
fn message_body(message: &PushMessage) -> Value {
    let mut notification = Map::new();
    notification.insert("title".to_string(), json!(message.title));
    notification.insert("body".to_string(), json!(message.body));
    if let Some(image) = &message.image {
        notification.insert("image".to_string(), json!(image));
    }

    json!({
        "message": {
            "token": message.token,
            "notification": notification,
            "data": message.data,
        }
    })
}

#[async_trait]
impl NotificationProvider for FcmProvider {
    fn provider_name(&self) -> &str {
        "fcm"
    }

    async fn send(&self, message: &PushMessage) -> Result<String, RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&message_body(message))
            .send()
            .await
            .map_err(|e| RelayError::DeliveryError(e.to_string()))?;

        let status = response.status();
        let response_body: Value = response.json().await.unwrap_or(Value::Null);
        debug!("{:?}", response_body);

        if !status.is_success() {
            let reason = response_body["error"]["message"]
                .as_str()
                .unwrap_or("no error message");
            return Err(RelayError::DeliveryError(format!(
                "FCM returned {status}: {reason}"
            )));
        }

        let message_id = response_body["name"]
            .as_str()
            .ok_or_else(|| {
                RelayError::DeliveryError("Failed to extract message name from FCM response".into())
            })?
            .to_string();

        Ok(message_id)
    }
}
