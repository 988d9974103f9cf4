use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::envelope::{extract_error, unwrap_envelope};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<Config>,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let builder = self.client.get(url).query(query);
        self.send(Method::GET, path, builder).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let builder = self.client.post(url).json(body);
        self.send(Method::POST, path, builder).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.config.endpoint(path)?;
        let builder = self.client.put(url).json(body);
        self.send(Method::PUT, path, builder).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T> {
        let request_id = Uuid::new_v4();
        let mut builder = builder.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        debug!(%method, path, %request_id, "Sending API request");
        let response = builder.send().await.map_err(|e| {
            warn!(%method, path, %request_id, error = %e, "API request failed in transport");
            Error::from(e)
        })?;

        let status = response.status();
        let raw = response.text().await.map_err(Error::from)?;

        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string();
            let (message, fields) = extract_error(&raw, &fallback);
            warn!(%method, path, %request_id, status = status.as_u16(), %message, "API request rejected");
            return Err(Error::from_status(status.as_u16(), message, fields));
        }

        let body = if raw.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&raw).map_err(|e| Error::Server {
                status: status.as_u16(),
                message: format!("Malformed response body: {}", e),
            })?
        };

        serde_json::from_value(unwrap_envelope(body)).map_err(|e| {
            warn!(%method, path, %request_id, error = %e, "API response did not match expected shape");
            Error::Server {
                status: status.as_u16(),
                message: format!("Unexpected response shape: {}", e),
            }
        })
    }
}
