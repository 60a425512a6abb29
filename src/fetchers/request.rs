use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::error::RelayError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; RecipeRelay/1.0)";

/// Downloads recipe pages over HTTP
#[derive(Debug, Clone)]
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self, RelayError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the page body; any non-success status is a fetch failure
    pub async fn fetch(&self, url: &str) -> Result<String, RelayError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}
