use config::ConfigError;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{
    AuthProvider, FirestoreTokenRegistry, IdentityToolkitProvider, InMemoryTokenRegistry,
    TokenRegistry,
};
use crate::config::{RelayConfig, Route, TokenBackend};
use crate::error::RelayError;
use crate::extractors::RecipePageExtractor;
use crate::fetchers::RequestFetcher;
use crate::notifications::{Dispatcher, FcmProvider};

/// Capabilities shared by every request handler
pub struct AppState {
    pub fetcher: RequestFetcher,
    pub extractor: RecipePageExtractor,
    /// Present when notifications are enabled
    pub dispatcher: Option<Dispatcher>,
    /// Data payload attached to every push message
    pub message_data: HashMap<String, String>,
    /// Present when an auth backend is configured
    pub auth: Option<Arc<dyn AuthProvider>>,
    pub tokens: Arc<dyn TokenRegistry>,
}

impl AppState {
    /// Build the capabilities the enabled routes need
    pub fn from_config(config: &RelayConfig) -> Result<Arc<Self>, RelayError> {
        let enabled = &config.routes.enabled;

        let fetcher = RequestFetcher::new(
            Some(config.fetch.timeout()),
            Some(&config.fetch.user_agent),
        )?;
        let extractor = RecipePageExtractor::new(&config.extractor)?;

        let dispatcher = if enabled.contains(&Route::SendNotification) {
            let provider = FcmProvider::new(&config.notification)?;
            info!(
                "Notifications enabled, delivery delay {:?}",
                config.notification.delay()
            );
            Some(Dispatcher::new(
                Arc::new(provider),
                config.notification.delay(),
            ))
        } else {
            None
        };

        let auth: Option<Arc<dyn AuthProvider>> = match &config.auth {
            Some(auth_config) if enabled.iter().any(Route::needs_auth) => {
                Some(Arc::new(IdentityToolkitProvider::new(auth_config)?))
            }
            _ => None,
        };

        let tokens: Arc<dyn TokenRegistry> = match config.tokens.backend {
            // Nothing can add tokens to a process-local registry from outside
            TokenBackend::Memory if enabled.contains(&Route::ConfirmEmail) => {
                return Err(ConfigError::Message(format!(
                    "route {} requires tokens.backend = \"firestore\"",
                    Route::ConfirmEmail.path()
                ))
                .into());
            }
            TokenBackend::Memory => Arc::new(InMemoryTokenRegistry::new()),
            TokenBackend::Firestore => Arc::new(FirestoreTokenRegistry::new(
                &config.tokens,
                config.auth.as_ref().map(|a| a.project_id.as_str()),
            )?),
        };

        Ok(Arc::new(Self {
            fetcher,
            extractor,
            dispatcher,
            message_data: config.notification.data.clone(),
            auth,
            tokens,
        }))
    }

    /// Name of the capability a route needs but this state lacks
    pub fn missing_capability(&self, route: Route) -> Option<&'static str> {
        match route {
            Route::SendNotification if self.dispatcher.is_none() => {
                Some("a notification provider")
            }
            Route::ResetPassword | Route::ConfirmEmail if self.auth.is_none() => {
                Some("an auth provider")
            }
            _ => None,
        }
    }
}
