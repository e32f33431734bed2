use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::error::AppError;

/// Keep-alive pinger
/// Hits the target on a fixed interval so a sleeping host stays awake
pub struct KeepAlive {
    client: Client,
    url: String,
    interval: Duration,
}

impl KeepAlive {
    pub fn new(url: impl Into<String>, interval: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            interval,
        })
    }

    /// Pings forever. Spawn it and forget it.
    pub async fn start(self) {
        info!("Starting keep-alive pinger for {} (interval: {:?})", self.url, self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.ping().await {
                Ok(status) => info!("Keep-alive ping to {} answered {}", self.url, status),
                // keep going, the next ping may land
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            }
        }
    }

    pub async fn ping(&self) -> Result<reqwest::StatusCode, AppError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("Keep-alive target answered {}", status)));
        }
        Ok(status)
    }
}
