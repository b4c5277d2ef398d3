//! # hatebu
//!
//! A typed client for Hatena Bookmark.
//!
//! ## Architecture
//!
//! ```text
//! Signer → HatenaBookmarkClient → REST API → domain records
//! Fetcher → Normalizer → FeedSearchClient → FeedEntry list
//! ```
//!
//! - [`auth`]: request signing (OAuth 1.0a)
//! - [`api`]: the authenticated REST client
//! - [`search`]: paginated search over the public search feed
//!
//! ## Quick Start
//!
//! ```bash
//! export HATENA_CONSUMER_KEY=... HATENA_CONSUMER_SECRET=...
//! export HATENA_ACCESS_TOKEN=... HATENA_ACCESS_TOKEN_SECRET=...
//!
//! # Bookmark a page
//! hatebu bookmark add https://example.com --comment "read later" --tag rust
//!
//! # Public entry data and counts
//! hatebu entry https://example.com
//! hatebu count https://example.com https://www.rust-lang.org
//!
//! # Search (no credentials needed)
//! hatebu search Python --users 100 --date-begin 2024-07-01 --max-pages 2
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires configuration and
/// credentials into the REST and search clients.
pub mod app;

/// Authenticated REST client.
///
/// - [`HatenaBookmarkClient`](api::HatenaBookmarkClient): one method per endpoint
/// - [`BookmarkUpdate`](api::BookmarkUpdate): fields for creating a bookmark
pub mod api;

/// Request signing.
///
/// - [`Signer`](auth::Signer): adds authentication to a request
/// - [`OAuth1Signer`](auth::OAuth1Signer): HMAC-SHA1 OAuth 1.0a
pub mod auth;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/hatebu/config.toml`.
pub mod config;

/// Records returned by the API and the search feed.
pub mod domain;

/// Raw page fetching for search.
pub mod fetcher;

/// Feed parsing into [`FeedEntry`](domain::FeedEntry) records.
pub mod normalizer;

/// Paginated feed search with skip/limit windowing and de-duplication.
pub mod search;

pub use api::{BookmarkUpdate, HatenaBookmarkClient};
pub use app::{HatebError, Result};
pub use auth::{OAuth1Signer, Signer};
pub use search::{FeedSearchClient, SearchQuery, SearchType, SortOrder};
