use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ChatResponse, ChatUiRequest, EngineStatusResponse};
use tracing::debug;

use crate::{error::TransportError, ChatTransport};

pub const DEFAULT_CHAT_PATH: &str = "/api/chat/ui";
pub const DEFAULT_STATUS_PATH: &str = "/api/chat/engine-status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub chat_path: String,
    pub status_path: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
        }
    }

    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    pub fn status_url(&self) -> String {
        join_url(&self.base_url, &self.status_path)
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base_url}/{path}")
}

/// Talks to the chat service over HTTP. No timeout and no retries: a request
/// that never resolves keeps the caller waiting.
pub struct HttpChatTransport {
    http: Client,
    endpoints: Endpoints,
}

impl HttpChatTransport {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    pub fn with_client(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send_chat(&self, request: &ChatUiRequest) -> Result<ChatResponse, TransportError> {
        let url = self.endpoints.chat_url();
        debug!(
            url = %url,
            session_id = %request.session_id,
            user_type = %request.user_type,
            "posting chat message"
        );
        let res = self
            .http
            .post(url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    async fn engine_status(&self) -> Result<EngineStatusResponse, TransportError> {
        let res = self
            .http
            .get(self.endpoints.status_url())
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
