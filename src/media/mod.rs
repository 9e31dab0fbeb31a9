//! Attachment resolution
//!
//! Turns a media reference into base64 text for inline model input. Three
//! reference shapes are recognised:
//!
//! - internal relative path (`/api/media/<key>`) → blob store lookup
//! - URL on an internal storage host, or carrying the internal prefix in its
//!   path → key parsed from the URL, then blob store lookup
//! - anything else → direct HTTP GET
//!
//! Resolution never fails loudly: every error is logged and becomes `None`.

mod store;

pub use store::{BlobObject, BlobStore, FsBlobStore, MemoryBlobStore, SharedBlobStore};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::MediaConfig;
use crate::constants::{media as media_constants, network};
use crate::types::{BugsightError, Result};

/// Base64 image payload ready for an inline-data request part
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// Where a reference points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Storage key from an internal relative reference
    Internal(String),
    /// Storage key parsed from an internal storage URL
    Storage(String),
    /// Anything else, fetched over HTTP
    External(String),
}

pub struct MediaResolver {
    store: SharedBlobStore,
    client: reqwest::Client,
    internal_prefix: String,
    storage_hosts: Vec<String>,
    bucket: Option<String>,
}

impl MediaResolver {
    pub fn new(config: &MediaConfig, store: SharedBlobStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network::DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BugsightError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            store,
            client,
            internal_prefix: config.internal_prefix.clone(),
            storage_hosts: config.storage_hosts.clone(),
            bucket: config.bucket.clone(),
        })
    }

    pub fn classify(&self, reference: &str) -> MediaSource {
        let reference = reference.trim();

        if let Some(key) = reference.strip_prefix(self.internal_prefix.as_str()) {
            return MediaSource::Internal(key.to_string());
        }

        if let Ok(url) = Url::parse(reference) {
            if let Some(key) = url.path().strip_prefix(self.internal_prefix.as_str()) {
                return MediaSource::Storage(key.to_string());
            }

            let internal_host = url.host_str().is_some_and(|host| {
                self.storage_hosts
                    .iter()
                    .any(|suffix| host == suffix || host.ends_with(&format!(".{}", suffix)))
            });
            if internal_host {
                return MediaSource::Storage(self.key_from_path(url.path()));
            }
        }

        MediaSource::External(reference.to_string())
    }

    /// Path-style storage URLs carry the bucket as the first segment
    fn key_from_path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if let Some(bucket) = &self.bucket
            && let Some(rest) = path.strip_prefix(bucket.as_str())
            && let Some(key) = rest.strip_prefix('/')
        {
            return key.to_string();
        }
        path.to_string()
    }

    /// Resolve a reference to base64 text, or `None` on any failure
    pub async fn resolve(&self, reference: &str) -> Option<String> {
        self.resolve_image(reference).await.map(|image| image.data)
    }

    /// Resolve a reference to an inline image.
    ///
    /// The MIME type comes from the object's `image/*` content type when it
    /// has one, otherwise from the payload's magic bytes.
    #[instrument(skip(self))]
    pub async fn resolve_image(&self, reference: &str) -> Option<InlineImage> {
        match self.fetch(reference).await {
            Ok(object) => {
                let mime_type = image_mime(&object);
                debug!(bytes = object.len(), mime_type = %mime_type, "Media resolved");
                Some(InlineImage {
                    mime_type,
                    data: BASE64.encode(object.into_bytes()),
                })
            }
            Err(e) => {
                warn!(error = %e, category = %e.category(), "Media unavailable, continuing without it");
                None
            }
        }
    }

    async fn fetch(&self, reference: &str) -> Result<BlobObject> {
        match self.classify(reference) {
            MediaSource::Internal(key) | MediaSource::Storage(key) => {
                if key.is_empty() {
                    return Err(BugsightError::media(reference, "empty storage key"));
                }
                debug!(store = self.store.name(), key = %key, "Fetching from blob store");
                match self.store.get(&key).await? {
                    Some(object) => Ok(object),
                    None => Err(BugsightError::media(reference, "object not found")),
                }
            }
            MediaSource::External(url) => {
                debug!(url = %url, "Fetching external media");
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| BugsightError::media(reference, e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(BugsightError::media(reference, format!("HTTP {}", status)));
                }

                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| BugsightError::media(reference, e.to_string()))?;

                let object = BlobObject::new(url, bytes.to_vec());
                Ok(match content_type {
                    Some(content_type) => object.with_content_type(content_type),
                    None => object,
                })
            }
        }
    }
}

fn image_mime(object: &BlobObject) -> String {
    let declared = object
        .content_type
        .as_deref()
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| value.starts_with("image/"));

    match declared {
        Some(mime) => mime,
        None => sniff_image_mime(object.body()).to_string(),
    }
}

/// Detect common image formats from magic bytes
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        media_constants::DEFAULT_IMAGE_MIME
    }
}
