//! [`ImageLoader`] backed by `data:` URIs, the local filesystem and HTTP.

use std::sync::Mutex;
use std::time::Duration;

use adcanvas_core::{CanvasResult, ImageLoader, ImagePixels, ImageRequest};
use async_trait::async_trait;
use reqwest::Client;

use crate::cache::{CacheConfig, CacheStats, ImageCache};
use crate::error::{RenderError, RenderResult};
use crate::image::{data_uri_bytes, decode_image, ImageFormat, ImageSource};

/// Default HTTP fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Configuration for [`ImageFetcher`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Timeout for a single HTTP fetch.
    pub timeout: Duration,
    /// Decoded image cache limits.
    pub cache: CacheConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            cache: CacheConfig::default(),
        }
    }
}

/// Loads and decodes images, caching the pixels by URL.
#[derive(Debug)]
pub struct ImageFetcher {
    http: Client,
    cache: Mutex<ImageCache>,
}

impl ImageFetcher {
    /// Create a fetcher with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> RenderResult<Self> {
        Self::with_config(LoaderConfig::default())
    }

    /// Create a fetcher with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_config(config: LoaderConfig) -> RenderResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("adcanvas/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| RenderError::Resource(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            cache: Mutex::new(ImageCache::with_config(config.cache)),
        })
    }

    /// Cache statistics, if the cache lock is healthy.
    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.lock().ok().map(|cache| cache.stats())
    }

    /// Fetch the encoded bytes behind a URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read.
    pub async fn fetch_bytes(&self, url: &str) -> RenderResult<Vec<u8>> {
        match ImageSource::classify(url) {
            ImageSource::DataUri => data_uri_bytes(url),
            ImageSource::File(path) => Ok(tokio::fs::read(&path).await?),
            ImageSource::Http => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| RenderError::Resource(format!("{url}: {e}")))?;
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| RenderError::Resource(format!("{url}: {e}")))?;
                Ok(body.to_vec())
            }
        }
    }

    /// Fetch and decode an image, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be read or decoded.
    pub async fn fetch(&self, url: &str) -> RenderResult<ImagePixels> {
        if let Some(pixels) = self.cache.lock().ok().and_then(|mut c| c.get(url)) {
            tracing::debug!(url = %url, "Image cache hit");
            return Ok(pixels);
        }

        let bytes = self.fetch_bytes(url).await?;
        let pixels = decode_image(&bytes)?;
        tracing::debug!(
            url = %url,
            format = ?ImageFormat::from_magic_bytes(&bytes),
            width = pixels.width,
            height = pixels.height,
            "Image decoded"
        );

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(url, pixels.clone());
        }
        Ok(pixels)
    }
}

#[async_trait]
impl ImageLoader for ImageFetcher {
    async fn load(&self, request: &ImageRequest) -> CanvasResult<ImagePixels> {
        Ok(self.fetch(&request.url).await?)
    }
}
