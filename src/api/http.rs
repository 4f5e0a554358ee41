//! Network retrieval over HTTP

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use crate::cache::{FetchError, Retrieve};

/// Retrieves resource bodies with a plain HTTP GET
#[derive(Debug, Clone, Default)]
pub struct HttpRetriever {
    client: Client,
}

impl HttpRetriever {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Retrieve for HttpRetriever {
    async fn retrieve(&self, locator: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(locator).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}
