mod identity_toolkit;
mod tokens;

pub use identity_toolkit::IdentityToolkitProvider;
pub use tokens::{FirestoreTokenRegistry, InMemoryTokenRegistry};

use async_trait::async_trait;

use crate::error::RelayError;

/// Identity backend that can verify users and change their credentials
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Resolve a client ID token to the user id it was issued for
    async fn verify_token(&self, id_token: &str) -> Result<String, RelayError>;

    async fn update_password(&self, uid: &str, password: &str) -> Result<(), RelayError>;

    async fn mark_email_verified(&self, uid: &str) -> Result<(), RelayError>;
}

/// Store of pending email confirmation tokens, keyed by token
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// User id the token was issued for; unknown tokens yield `None`
    async fn lookup(&self, token: &str) -> Result<Option<String>, RelayError>;

    /// Delete a token once it has been used. Unknown tokens are ignored.
    async fn remove(&self, token: &str) -> Result<(), RelayError>;
}
