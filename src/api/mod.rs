//! Authenticated client for the Hatena Bookmark REST API.
//!
//! The service uses status codes as part of its contract: 404 means "nothing
//! there" and is returned as `None` (or the status itself for deletes), 403
//! is a permission problem with its own error variant, and anything else
//! unexpected becomes [`HatebError::Api`].
//!
//! One request is in flight per call. The client can be shared between tasks
//! because `reqwest::Client` is, but calls made concurrently are not ordered
//! with respect to each other.

use std::collections::HashMap;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::{HatebError, Result};
use crate::auth::Signer;
use crate::config::ApiConfig;
use crate::domain::{Bookmark, EntryLookup, Tags, UserInfo};

pub const USER_AGENT: &str = concat!("hatebu/", env!("CARGO_PKG_VERSION"));

/// Upper bound on URLs accepted by the bulk count endpoint.
pub const MAX_COUNT_URLS: usize = 50;

const BOOKMARK_ENDPOINT: &str = "rest/1/my/bookmark";
const ENTRY_ENDPOINT: &str = "rest/1/entry";
const TAGS_ENDPOINT: &str = "rest/1/my/tags";
const USER_ENDPOINT: &str = "rest/1/my";
const COUNT_ENDPOINT: &str = "count/entry";
const COUNTS_ENDPOINT: &str = "count/entries";

/// Fields sent when creating or editing a bookmark.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkUpdate {
    pub url: String,
    pub comment: String,
    pub tags: Vec<String>,
    pub post_twitter: bool,
    pub post_mixi: bool,
    pub post_evernote: bool,
    pub private: bool,
}

impl BookmarkUpdate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn with_post_twitter(mut self, post: bool) -> Self {
        self.post_twitter = post;
        self
    }

    pub fn with_post_mixi(mut self, post: bool) -> Self {
        self.post_mixi = post;
        self
    }

    pub fn with_post_evernote(mut self, post: bool) -> Self {
        self.post_evernote = post;
        self
    }

    fn append_to(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        query.append_pair("url", &self.url);
        query.append_pair("comment", &self.comment);
        for tag in &self.tags {
            query.append_pair("tags", tag);
        }
        query.append_pair("post_twitter", bool_param(self.post_twitter));
        query.append_pair("post_mixi", bool_param(self.post_mixi));
        query.append_pair("post_evernote", bool_param(self.post_evernote));
        query.append_pair("private", bool_param(self.private));
    }
}

fn bool_param(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// Error for a status the calling operation does not handle itself.
    fn into_error(self) -> HatebError {
        tracing::warn!(status = %self.status, "Unexpected Hatena API status");
        if self.status == StatusCode::FORBIDDEN {
            HatebError::PermissionDenied(self.body)
        } else {
            HatebError::Api {
                status: self.status.as_u16(),
                body: self.body,
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, target: &'static str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| HatebError::decode(target, e))
    }
}

pub struct HatenaBookmarkClient {
    base_url: Url,
    http: Client,
    signer: Box<dyn Signer + Send + Sync>,
}

impl HatenaBookmarkClient {
    pub fn new(signer: impl Signer + Send + Sync + 'static) -> Result<Self> {
        Self::with_config(signer, &ApiConfig::default())
    }

    pub fn with_config(signer: impl Signer + Send + Sync + 'static, config: &ApiConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let http = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            base_url,
            http,
            signer: Box::new(signer),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the caller's bookmark on `url`; `None` if there is none.
    pub async fn get_bookmark(&self, url: &str) -> Result<Option<Bookmark>> {
        let endpoint = self.endpoint_with_url(BOOKMARK_ENDPOINT, url)?;
        let response = self.send(Method::GET, endpoint).await?;

        match response.status {
            StatusCode::OK => response.decode("bookmark").map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(response.into_error()),
        }
    }

    /// Create or overwrite the caller's bookmark. `None` when the service
    /// answers 404.
    pub async fn update_bookmark(&self, update: &BookmarkUpdate) -> Result<Option<Bookmark>> {
        let mut endpoint = self.endpoint(BOOKMARK_ENDPOINT)?;
        update.append_to(&mut endpoint);
        let response = self.send(Method::POST, endpoint).await?;

        match response.status {
            StatusCode::OK => response.decode("bookmark").map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(response.into_error()),
        }
    }

    /// Delete the caller's bookmark on `url`.
    ///
    /// Returns the response status: 200 or 204 when deleted, 404 when there
    /// was nothing to delete.
    pub async fn delete_bookmark(&self, url: &str) -> Result<StatusCode> {
        let endpoint = self.endpoint_with_url(BOOKMARK_ENDPOINT, url)?;
        let response = self.send(Method::DELETE, endpoint).await?;

        match response.status {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(response.status),
            _ => Err(response.into_error()),
        }
    }

    /// Look up public entry data for `url`.
    ///
    /// The service answers unknown pages with a body carrying a `message`,
    /// which becomes [`EntryLookup::NotFound`].
    pub async fn get_entry(&self, url: &str) -> Result<EntryLookup> {
        let endpoint = self.endpoint_with_url(ENTRY_ENDPOINT, url)?;
        let response = self.send(Method::GET, endpoint).await?;

        if !(response.status.is_success() || response.status == StatusCode::NOT_FOUND) {
            return Err(response.into_error());
        }

        let value: serde_json::Value = response.decode("entry")?;
        EntryLookup::from_value(value)
    }

    pub async fn get_tags(&self) -> Result<Tags> {
        let endpoint = self.endpoint(TAGS_ENDPOINT)?;
        let response = self.send(Method::GET, endpoint).await?;

        match response.status {
            StatusCode::OK => response.decode("tags"),
            _ => Err(response.into_error()),
        }
    }

    pub async fn get_user_info(&self) -> Result<UserInfo> {
        let endpoint = self.endpoint(USER_ENDPOINT)?;
        let response = self.send(Method::GET, endpoint).await?;

        match response.status {
            StatusCode::OK => response.decode("user info"),
            _ => Err(response.into_error()),
        }
    }

    /// Number of users who bookmarked `url`.
    pub async fn get_bookmark_count(&self, url: &str) -> Result<u64> {
        let endpoint = self.endpoint_with_url(COUNT_ENDPOINT, url)?;
        let response = self.send(Method::GET, endpoint).await?;

        if response.status != StatusCode::OK {
            return Err(HatebError::Api {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        response
            .body
            .trim()
            .parse()
            .map_err(|e| HatebError::decode("bookmark count", e))
    }

    /// Bookmark counts for up to [`MAX_COUNT_URLS`] URLs in one request.
    ///
    /// Longer lists are rejected before anything is sent.
    pub async fn get_bookmark_counts<S: AsRef<str>>(&self, urls: &[S]) -> Result<HashMap<String, u64>> {
        if urls.len() > MAX_COUNT_URLS {
            return Err(HatebError::Validation(format!(
                "Maximum number of URLs is {MAX_COUNT_URLS}, got {}",
                urls.len()
            )));
        }

        let mut endpoint = self.endpoint(COUNTS_ENDPOINT)?;
        {
            let mut query = endpoint.query_pairs_mut();
            for url in urls {
                query.append_pair("url", url.as_ref());
            }
        }
        let response = self.send(Method::GET, endpoint).await?;

        if response.status != StatusCode::OK {
            return Err(HatebError::Api {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        response.decode("bookmark counts")
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn endpoint_with_url(&self, path: &str, url: &str) -> Result<Url> {
        let mut endpoint = self.endpoint(path)?;
        endpoint.query_pairs_mut().append_pair("url", url);
        Ok(endpoint)
    }

    async fn send(&self, method: Method, url: Url) -> Result<ApiResponse> {
        tracing::debug!(%method, path = url.path(), "Hatena API request");

        let mut request = self.http.request(method, url).build()?;
        self.signer.sign(&mut request)?;

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(%status, bytes = body.len(), "Hatena API response");
        Ok(ApiResponse { status, body })
    }
}
