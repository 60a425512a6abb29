use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::extractors::ExtractionRules;
use crate::fetchers::DEFAULT_USER_AGENT;

/// Main service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Port to listen on (0.0.0.0)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Which endpoints are mounted
    #[serde(default)]
    pub routes: RoutesConfig,
    /// Recipe page download settings
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Push notification provider settings
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Identity provider, required by the auth routes
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Pending email confirmation tokens
    #[serde(default)]
    pub tokens: TokenRegistryConfig,
    /// Selector overrides for the recipe extractor
    #[serde(default)]
    pub extractor: ExtractionRules,
}

/// HTTP endpoints the relay can expose
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    SendNotification,
    GetRecipe,
    ResetPassword,
    ConfirmEmail,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SendNotification => "/send-notification",
            Route::GetRecipe => "/get-recipe",
            Route::ResetPassword => "/reset-password",
            Route::ConfirmEmail => "/confirm-email",
        }
    }

    /// Whether the route needs an auth provider to be configured
    pub fn needs_auth(&self) -> bool {
        matches!(self, Route::ResetPassword | Route::ConfirmEmail)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutesConfig {
    #[serde(default = "default_routes")]
    pub enabled: Vec<Route>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            enabled: default_routes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Configuration for the push notification provider (FCM HTTP v1)
#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Delay before the delivery call is made, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Firebase project the messages are sent through
    pub project_id: Option<String>,
    /// OAuth2 access token (can also be set via FCM_ACCESS_TOKEN)
    pub access_token: Option<String>,
    #[serde(default = "default_fcm_base_url")]
    pub base_url: String,
    /// Data payload attached to every message
    #[serde(default = "default_message_data")]
    pub data: HashMap<String, String>,
    /// How long shutdown waits for queued deliveries, in milliseconds
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            project_id: None,
            access_token: None,
            base_url: default_fcm_base_url(),
            data: default_message_data(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl NotificationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Configuration for the identity provider (Identity Toolkit REST API)
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Web API key used for token lookups (can also be set via FIREBASE_API_KEY)
    pub api_key: Option<String>,
    pub project_id: String,
    /// OAuth2 access token for admin updates (can also be set via GOOGLE_ACCESS_TOKEN)
    pub access_token: Option<String>,
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenBackend {
    #[default]
    Memory,
    Firestore,
}

/// Where pending email confirmation tokens live
#[derive(Debug, Deserialize, Clone)]
pub struct TokenRegistryConfig {
    #[serde(default)]
    pub backend: TokenBackend,
    #[serde(default = "default_token_collection")]
    pub collection: String,
    /// Firestore project, defaults to the auth project
    pub project_id: Option<String>,
    /// OAuth2 access token (can also be set via GOOGLE_ACCESS_TOKEN)
    pub access_token: Option<String>,
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,
}

impl Default for TokenRegistryConfig {
    fn default() -> Self {
        Self {
            backend: TokenBackend::default(),
            collection: default_token_collection(),
            project_id: None,
            access_token: None,
            base_url: default_firestore_base_url(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_routes() -> Vec<Route> {
    vec![Route::SendNotification, Route::GetRecipe]
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_shutdown_grace_ms() -> u64 {
    5000
}

fn default_fcm_base_url() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_message_data() -> HashMap<String, String> {
    HashMap::from([("customDataKey".to_string(), "customDataValue".to_string())])
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_token_collection() -> String {
    "emailConfirmationTokens".to_string()
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

impl RelayConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. PORT environment variable (port only)
    /// 2. Environment variables with RELAY__ prefix
    /// 3. config.toml file in current directory
    /// 4. Default values
    ///
    /// Environment variable format: RELAY__NOTIFICATION__PROJECT_ID
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`RelayConfig::load`] for the source priority.
pub fn load_config() -> Result<RelayConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RELAY__FETCH__TIMEOUT
        .add_source(
            Environment::with_prefix("RELAY")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("routes.enabled")
                .try_parsing(true),
        )
        .set_override_option("port", std::env::var("PORT").ok())?
        .build()?;

    settings.try_deserialize()
}
