//! Proxy to the backend's chat automation endpoint.
//!
//! The backend forwards messages to an external workflow engine and returns
//! `{ "output": ... }`; the engine itself is opaque to this client. The
//! current identity (or its absence) rides along with every message.

use crate::api::ApiClient;
use crate::api::types::{ChatRequest, Identity};
use crate::error::ApiError;

/// Reply used when the automation produces no output.
const EMPTY_REPLY: &str = "I received your message but could not generate a response.";

/// Client for the chat automation proxy.
#[derive(Clone)]
pub struct AgentClient {
    api: ApiClient,
}

impl AgentClient {
    /// Create an agent client backed by the given API client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Send a message and return the assistant's reply.
    ///
    /// Works for guests too; the backend is told whether the sender is
    /// authenticated and, if so, who they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. No automatic retry.
    pub async fn ask(&self, text: &str, identity: Option<&Identity>) -> Result<String, ApiError> {
        let request = ChatRequest {
            text: text.to_owned(),
            user_id: identity.map(|i| i.id),
            is_authenticated: identity.is_some(),
        };

        let response = self.api.agent_chat(&request).await?;
        Ok(response
            .output
            .unwrap_or_else(|| EMPTY_REPLY.to_owned()))
    }
}
