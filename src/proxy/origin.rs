//! Remote tile origin.
//!
//! The default origin is a tile provider that only answers requests carrying
//! browser-like headers, a matching referer and a session cookie. These are
//! opaque configuration values, sent verbatim on every request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE, COOKIE, REFERER,
    USER_AGENT,
};
use tracing::debug;
use url::Url;

use crate::error::OriginError;
use crate::tile::TileCoord;

use super::store::TileBlob;

/// Default origin URL template.
pub const DEFAULT_ORIGIN_URL: &str =
    "https://proxy.nakarte.me/http/nakartetiles.s3-website.eu-central-1.amazonaws.com/{z}/{x}/{y}.png";

/// Default session cookie.
pub const DEFAULT_ORIGIN_COOKIE: &str = "uid=AAAAEWg1iHsI3zABAwOuAg==";

/// Default referer.
pub const DEFAULT_ORIGIN_REFERER: &str = "https://nakarte.me/";

/// Default user agent.
pub const DEFAULT_ORIGIN_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Default accept header.
pub const DEFAULT_ORIGIN_ACCEPT: &str =
    "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Default accept-language header.
pub const DEFAULT_ORIGIN_ACCEPT_LANGUAGE: &str = "ru,en;q=0.9";

/// Default request timeout in seconds.
pub const DEFAULT_ORIGIN_TIMEOUT_SECS: u64 = 10;

/// Source of tiles fetched on cache miss.
#[async_trait]
pub trait TileOrigin: Send + Sync {
    /// Fetch one tile. Any failure is terminal; callers do not retry.
    async fn fetch(&self, coord: TileCoord) -> Result<TileBlob, OriginError>;
}

/// Request parameters for an HTTP origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginConfig {
    /// URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,

    /// Raw `Cookie` header value, if any
    pub cookie: Option<String>,

    pub referer: Option<String>,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,

    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_ORIGIN_URL.to_string(),
            cookie: Some(DEFAULT_ORIGIN_COOKIE.to_string()),
            referer: Some(DEFAULT_ORIGIN_REFERER.to_string()),
            user_agent: DEFAULT_ORIGIN_USER_AGENT.to_string(),
            accept: DEFAULT_ORIGIN_ACCEPT.to_string(),
            accept_language: DEFAULT_ORIGIN_ACCEPT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_ORIGIN_TIMEOUT_SECS),
        }
    }
}

impl OriginConfig {
    /// Origin with default headers at `url_template`.
    pub fn with_url_template(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Self::default()
        }
    }

    /// Substitute `coord` into the template.
    pub fn tile_url(&self, coord: TileCoord) -> Result<Url, OriginError> {
        let url = self
            .url_template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());
        Url::parse(&url).map_err(|e| OriginError::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Check the template parses and names all three placeholders.
    pub fn validate(&self) -> Result<(), String> {
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return Err(format!(
                    "Origin URL template must contain {}: {}",
                    placeholder, self.url_template
                ));
            }
        }
        let url = self
            .tile_url(TileCoord::new(0, 0, 0))
            .map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("Origin URL must be http or https: {}", url));
        }
        Ok(())
    }

    fn headers(&self) -> Result<HeaderMap, OriginError> {
        fn value(name: &str, v: &str) -> Result<HeaderValue, OriginError> {
            HeaderValue::from_str(v)
                .map_err(|e| OriginError::Client(format!("invalid {} header: {}", name, e)))
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value("User-Agent", &self.user_agent)?);
        headers.insert(ACCEPT, value("Accept", &self.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            value("Accept-Language", &self.accept_language)?,
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        if let Some(ref referer) = self.referer {
            headers.insert(REFERER, value("Referer", referer)?);
        }
        if let Some(ref cookie) = self.cookie {
            let mut cookie = value("Cookie", cookie)?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }
        Ok(headers)
    }
}

/// Origin reached over HTTP(S) with a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: reqwest::Client,
    config: OriginConfig,
}

impl HttpOrigin {
    pub fn new(config: OriginConfig) -> Result<Self, OriginError> {
        let client = reqwest::Client::builder()
            .default_headers(config.headers()?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| OriginError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OriginConfig {
        &self.config
    }
}

#[async_trait]
impl TileOrigin for HttpOrigin {
    async fn fetch(&self, coord: TileCoord) -> Result<TileBlob, OriginError> {
        let url = self.config.tile_url(coord)?;
        debug!(tile = %coord, url = %url, "Fetching from origin");

        let transport = |e: reqwest::Error| OriginError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OriginError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = response.bytes().await.map_err(transport)?;

        Ok(TileBlob::new(data, content_type))
    }
}
