use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ClientConfig;
use crate::domain::OEIS_URL;
use crate::error::OeisError;

// One blocking GET per call, no retries.
pub trait OeisClient: Send + Sync {
    fn base_url(&self) -> &str {
        OEIS_URL
    }

    fn get_text(&self, url: &str) -> Result<String, OeisError>;
}

impl<T: OeisClient + ?Sized> OeisClient for &T {
    fn base_url(&self) -> &str {
        (**self).base_url()
    }

    fn get_text(&self, url: &str) -> Result<String, OeisError> {
        (**self).get_text(url)
    }
}

impl<T: OeisClient + ?Sized> OeisClient for Arc<T> {
    fn base_url(&self) -> &str {
        (**self).base_url()
    }

    fn get_text(&self, url: &str) -> Result<String, OeisError> {
        (**self).get_text(url)
    }
}

#[derive(Clone)]
pub struct OeisHttpClient {
    client: Client,
    base_url: String,
}

impl OeisHttpClient {
    pub fn new() -> Result<Self, OeisError> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self, OeisError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|err| OeisError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|err| OeisError::Http(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, OeisError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "OEIS request failed".to_string());
        Err(OeisError::Status { status, message })
    }
}

impl OeisClient for OeisHttpClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_text(&self, url: &str) -> Result<String, OeisError> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| OeisError::Http(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| OeisError::Http(err.to_string()))
    }
}
