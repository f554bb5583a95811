use std::sync::OnceLock;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{Endpoint, Gateway, Payload, RawResponse, Request, Transport};
use crate::protocol;

/// [`Transport`] over HTTP: queries become GETs, forms become POSTs.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn url(&self, endpoint: Endpoint) -> String {
        self.config.endpoint_url(endpoint.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse, ClientError> {
        let url = self.url(request.endpoint);
        let builder = match &request.payload {
            Payload::Query(pairs) => http_client().get(&url).query(pairs),
            Payload::Form(pairs) => http_client().post(&url).form(pairs),
        };
        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response
            .text()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(RawResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

pub fn gateway(config: &ClientConfig) -> Gateway {
    Gateway::new(HttpTransport::new(config))
}

/// Fetches the raw `label:identifier` listing of every entry.
pub async fn fetch_catalog(gateway: &Gateway) -> Result<String, ClientError> {
    gateway
        .send(Endpoint::Pokedex, protocol::catalog_payload())
        .await
}
