mod dispatch;
mod fcm;

pub use dispatch::{DispatchHandle, Dispatcher};
pub use fcm::FcmProvider;

use async_trait::async_trait;

use crate::error::RelayError;
use crate::model::PushMessage;

/// A service able to deliver push notifications to a device
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Get the provider name (e.g., "fcm")
    fn provider_name(&self) -> &str;

    /// Deliver one message, returning the provider's message id
    async fn send(&self, message: &PushMessage) -> Result<String, RelayError>;
}
