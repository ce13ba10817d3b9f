//! Photo feed types and client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use s11_core::error::AppError;
use s11_core::result::AppResult;

/// A coordinate as it appears in the feed: either a number or a numeric
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedCoordinate {
    Number(f64),
    Text(String),
}

impl FeedCoordinate {
    /// Numeric value, if the coordinate parses.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Media links of a feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMedia {
    /// Medium-size thumbnail.
    pub m: String,
}

/// One entry of the photo feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Photo page.
    pub link: String,
    /// Thumbnails.
    pub media: FeedMedia,
    /// Capture date.
    #[serde(default)]
    pub date_taken: Option<String>,
    /// Space-separated tags.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub latitude: Option<FeedCoordinate>,
    #[serde(default)]
    pub longitude: Option<FeedCoordinate>,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    items: Vec<FeedItem>,
}

/// Source of geotagged photo feed entries.
#[async_trait]
pub trait PhotoFeedService: Send + Sync {
    /// Fetches the feed entries carrying `tag`.
    async fn fetch_tag(&self, tag: &str) -> AppResult<Vec<FeedItem>>;
}

/// Geotagged photo feed reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPhotoFeed {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
}

impl HttpPhotoFeed {
    /// Creates a client for the feed at `base_url` of the given account.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            account_id: account_id.into(),
        }
    }

    /// Feed URL for one tag.
    pub fn feed_url(&self, tag: &str) -> AppResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid photo feed URL '{}': {e}", self.base_url))
        })?;
        url.query_pairs_mut()
            .append_pair("id", &self.account_id)
            .append_pair("lang", "en-us")
            .append_pair("format", "json")
            .append_pair("nojsoncallback", "1")
            .append_pair("georss", "true")
            .append_pair("tagmode", "any")
            .append_pair("tags", tag);
        Ok(url)
    }
}

#[async_trait]
impl PhotoFeedService for HttpPhotoFeed {
    async fn fetch_tag(&self, tag: &str) -> AppResult<Vec<FeedItem>> {
        let url = self.feed_url(tag)?;
        debug!(url = %url, tag = %tag, "Fetching photo feed");

        let feed = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Feed>()
            .await?;
        Ok(feed.items)
    }
}
