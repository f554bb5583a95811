use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Status reported by transports that have no status line (local or offline
/// fixtures). Treated as success.
pub const NO_STATUS: u16 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Endpoint {
    /// `pokedex.php`: catalog listing and entry details.
    Pokedex,
    /// `game.php`: battle start and turns.
    Game,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Pokedex => "pokedex.php",
            Endpoint::Game => "game.php",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Payload {
    /// Sent as a GET query string.
    Query(Vec<(String, String)>),
    /// Sent as a POST form body.
    Form(Vec<(String, String)>),
}

impl Payload {
    pub fn query<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Payload::Query(collect_pairs(pairs))
    }

    pub fn form<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Payload::Form(collect_pairs(pairs))
    }

    pub fn pairs(&self) -> &[(String, String)] {
        match self {
            Payload::Query(pairs) | Payload::Form(pairs) => pairs,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn collect_pairs<K: Into<String>, V: Into<String>>(
    pairs: impl IntoIterator<Item = (K, V)>,
) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub payload: Payload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: body.into(),
        }
    }
}

/// Executes one exchange. Implementations only fail when the exchange could
/// not complete at all; status handling belongs to [`Gateway`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<RawResponse, ClientError>;
}

pub fn is_success(status: u16) -> bool {
    status == NO_STATUS || (200..300).contains(&status)
}

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Sends one request and returns the raw body on a success status.
    pub async fn send(&self, endpoint: Endpoint, payload: Payload) -> Result<String, ClientError> {
        let request = Request { endpoint, payload };
        let response = self.transport.execute(&request).await.map_err(|err| {
            tracing::warn!(endpoint = endpoint.path(), error = %err, "exchange failed");
            err
        })?;
        if !is_success(response.status) {
            tracing::warn!(
                endpoint = endpoint.path(),
                status = response.status,
                reason = %response.reason,
                "exchange rejected"
            );
            return Err(ClientError::Rejected {
                code: response.status,
                message: response.reason,
            });
        }
        tracing::debug!(
            endpoint = endpoint.path(),
            status = response.status,
            bytes = response.body.len(),
            "exchange complete"
        );
        Ok(response.body)
    }
}
