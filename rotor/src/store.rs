use crate::config::StoreConfig;
use crate::errors::RotorError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// The single key holding the rotation cursor.
pub const CURSOR_KEY: &str = "ua:currentIndex";

/// Applies to the whole round-trip; a timeout is a hard failure for the
/// request, never retried here.
const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-value store holding the rotation cursor.
///
/// Plain get/set only. There is deliberately no compare-and-swap: concurrent
/// requests racing on read-modify-write may serve the same index twice and
/// skip one position, which is accepted behavior for this service.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Returns the stored value as a string, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, RotorError>;

    async fn set(&self, key: &str, value: i64) -> Result<(), RotorError>;
}

#[derive(Deserialize)]
struct CommandReply {
    result: Option<serde_json::Value>,
}

/// Client for an Upstash-style Redis REST endpoint.
///
/// Commands are path segments (`/get/<key>`, `/set/<key>/<value>`)
/// authenticated with a bearer token; replies are JSON `{"result": ...}`
/// where a null result on `get` means the key does not exist.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, RotorError> {
        let client = reqwest::Client::builder()
            .timeout(STORE_TIMEOUT)
            .build()
            .map_err(|e| RotorError::StoreRequest(e.to_string()))?;

        Ok(RestStore {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn command(&self, path: &str) -> Result<CommandReply, RotorError> {
        let url = format!("{}/{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RotorError::StoreRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RotorError::StoreProtocol(format!(
                "store returned {status}: {body}"
            )));
        }

        response
            .json::<CommandReply>()
            .await
            .map_err(|e| RotorError::StoreProtocol(e.to_string()))
    }
}

#[async_trait]
impl CursorStore for RestStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RotorError> {
        let reply = self.command(&format!("get/{key}")).await?;

        // Values we wrote come back as JSON strings; anything else (the
        // store is shared, by contract only we write it) is rendered as-is
        // and normalized downstream by the wraparound step.
        Ok(reply.result.map(|value| match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    async fn set(&self, key: &str, value: i64) -> Result<(), RotorError> {
        self.command(&format!("set/{key}/{value}")).await?;
        Ok(())
    }
}
