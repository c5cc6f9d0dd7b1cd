//! Remote review API seam.
//!
//! The reconciler talks to the marketplace through the [`ReviewApi`] trait
//! so tests can substitute a double for the HTTP client. A sweep serves
//! many accounts with distinct credentials, so clients are produced per
//! account by an [`ApiConnector`].

use async_trait::async_trait;
use wb_api::{RawReview, WbClient, WbConfig, WbError};

/// Operations the reconciler needs from the remote review API.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Fetch the account's unanswered reviews. Degrades to empty on failure.
    async fn fetch_unanswered(&self) -> Vec<RawReview>;

    /// Fetch the account's answered reviews. Degrades to empty on failure.
    async fn fetch_answered(&self) -> Vec<RawReview>;

    /// Submit a reply. True only on confirmed remote success.
    async fn send_reply(&self, feedback_id: &str, text: &str) -> bool;
}

#[async_trait]
impl ReviewApi for WbClient {
    async fn fetch_unanswered(&self) -> Vec<RawReview> {
        WbClient::fetch_unanswered(self).await
    }

    async fn fetch_answered(&self) -> Vec<RawReview> {
        WbClient::fetch_answered(self).await
    }

    async fn send_reply(&self, feedback_id: &str, text: &str) -> bool {
        WbClient::send_reply(self, feedback_id, text).await
    }
}

/// Produces a [`ReviewApi`] client for an account's credential.
pub trait ApiConnector: Send + Sync {
    /// The client type produced for one account.
    type Api: ReviewApi;

    /// Build a client authenticated with the given API key.
    fn connect(&self, api_key: &str) -> Result<Self::Api, WbError>;
}

/// Connector backed by the real feedbacks API.
#[derive(Debug, Clone, Default)]
pub struct WbConnector {
    config: WbConfig,
}

impl WbConnector {
    /// Create a connector that hands each account a client with this config.
    pub fn new(config: WbConfig) -> Self {
        Self { config }
    }
}

impl ApiConnector for WbConnector {
    type Api = WbClient;

    fn connect(&self, api_key: &str) -> Result<WbClient, WbError> {
        WbClient::new(api_key, self.config.clone())
    }
}
