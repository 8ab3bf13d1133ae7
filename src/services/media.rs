//! Media host integration.
//!
//! Images are uploaded from the browser straight to the media host; the API
//! only stores the returned URL and asset id. This module deletes assets that
//! are no longer referenced by any record.

use crate::config::MediaHostConfig;
use crate::errors::ServiceError;
use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Remote store that owns uploaded image assets
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Removes one asset by its opaque id.
    async fn delete_asset(&self, public_id: &str) -> Result<(), ServiceError>;
}

/// Deletes every asset concurrently and returns how many were removed.
///
/// Failures are logged and counted; nothing is retried or rolled back.
pub async fn delete_assets(host: &dyn MediaHost, public_ids: Vec<String>) -> usize {
    if public_ids.is_empty() {
        return 0;
    }

    let results = join_all(public_ids.iter().map(|id| host.delete_asset(id))).await;

    let mut deleted = 0;
    for (public_id, result) in public_ids.iter().zip(results) {
        match result {
            Ok(()) => deleted += 1,
            Err(e) => {
                counter!("storefront_media.delete_failures", 1);
                warn!(public_id = %public_id, error = %e, "media asset deletion failed");
            }
        }
    }
    deleted
}

/// Builds the media host for the given configuration.
///
/// Without credentials a [`NoopMediaHost`] is returned.
pub fn media_host_from_config(
    config: &MediaHostConfig,
) -> Result<Arc<dyn MediaHost>, ServiceError> {
    match config.credentials() {
        Some((cloud_name, api_key, api_secret)) => Ok(Arc::new(CloudinaryClient::new(
            &config.api_base_url,
            cloud_name,
            api_key,
            api_secret,
        )?)),
        None => {
            info!("Media host credentials not configured; asset deletion is disabled");
            Ok(Arc::new(NoopMediaHost))
        }
    }
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary `image/destroy` client
#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    destroy_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(
        base_url: &str,
        cloud_name: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("media host client: {e}")))?;

        Ok(Self {
            client,
            destroy_url: format!(
                "{}/v1_1/{}/image/destroy",
                base_url.trim_end_matches('/'),
                cloud_name
            ),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    /// Signature over the alphabetically sorted parameters followed by the secret.
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(joined.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    #[instrument(skip(self))]
    async fn delete_asset(&self, public_id: &str) -> Result<(), ServiceError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = Self::sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.api_secret,
        );

        let form = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(&self.destroy_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("media host: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "media host returned {} for {}",
                response.status(),
                public_id
            )));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("media host: {e}")))?;

        match body.result.as_str() {
            "ok" => {
                debug!(public_id, "media asset deleted");
                Ok(())
            }
            "not found" => {
                debug!(public_id, "media asset already gone");
                Ok(())
            }
            other => Err(ServiceError::ExternalServiceError(format!(
                "media host refused to delete {public_id}: {other}"
            ))),
        }
    }
}

/// Used when no media host is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMediaHost;

#[async_trait]
impl MediaHost for NoopMediaHost {
    async fn delete_asset(&self, public_id: &str) -> Result<(), ServiceError> {
        debug!(public_id, "media host disabled; asset left in place");
        Ok(())
    }
}
