pub mod http_fetcher;

use async_trait::async_trait;
use url::Url;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Retrieves the raw body of one feed page.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}
