use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ImageRef, StyleName},
    error::TransferError,
    protocol::{StyleTransferRequest, StyleTransferResponse},
};
use tracing::debug;

use crate::config::Settings;

#[async_trait]
pub trait StyleTransferService: Send + Sync {
    async fn transfer(&self, image: &ImageRef, style: StyleName)
        -> Result<ImageRef, TransferError>;
}

/// One `POST /style-transfer` per call, no retries.
pub struct HttpStyleTransfer {
    http: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpStyleTransfer {
    pub fn new(service_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/style-transfer", service_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.service_url, settings.transfer_timeout())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransferError {
    if err.is_timeout() {
        TransferError::Timeout
    } else {
        TransferError::Network(err.to_string())
    }
}

#[async_trait]
impl StyleTransferService for HttpStyleTransfer {
    async fn transfer(
        &self,
        image: &ImageRef,
        style: StyleName,
    ) -> Result<ImageRef, TransferError> {
        let mut request = self.http.post(&self.endpoint).json(&StyleTransferRequest {
            image_url: image.clone(),
            style,
        });
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!(endpoint = %self.endpoint, %style, "sending style transfer request");
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let body: StyleTransferResponse = serde_json::from_slice(&bytes)
            .map_err(|err| TransferError::Malformed(err.to_string()))?;
        if body.stylized_image_url.as_str().trim().is_empty() {
            return Err(TransferError::Malformed(
                "empty stylizedImageUrl".to_string(),
            ));
        }
        Ok(body.stylized_image_url)
    }
}

#[cfg(test)]
#[path = "tests/style_transfer_tests.rs"]
mod tests;
