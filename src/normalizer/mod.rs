//! Turns one fetched search page into [`FeedEntry`] records.
//!
//! Bookmark search answers with RSS 1.0 whose items carry extra elements in
//! the `hatena:` namespace. Those are read through the `rss` crate's extension
//! map. Anything `rss` cannot read (Atom, mostly) goes through `feed-rs`, which
//! has no access to the namespace, so the Hatena fields stay `None`.

use chrono::DateTime;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{HatebError, Result};
use crate::domain::FeedEntry;

const HATENA_PREFIX: &str = "hatena";
const HATENA_NS: &str = "http://www.hatena.ne.jp/info/xmlns#";

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, body: &[u8]) -> Result<Vec<FeedEntry>> {
        match rss::Channel::read_from(body) {
            Ok(channel) => Ok(channel.items().iter().map(from_rss_item).collect()),
            Err(rss_err) => {
                tracing::debug!("Not an RSS document ({rss_err}), trying feed-rs");
                let feed = parser::parse(body)
                    .map_err(|e| HatebError::FeedParse(format!("{rss_err}; {e}")))?;
                Ok(feed.entries.into_iter().map(from_feed_rs_entry).collect())
            }
        }
    }
}

fn from_rss_item(item: &rss::Item) -> FeedEntry {
    let link = item.link().unwrap_or_default().to_string();
    // RSS 1.0 items carry no guid and `rss` does not expose `rdf:about`;
    // search feeds set both to the link.
    let id = item
        .guid()
        .map(|g| g.value().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| link.clone());

    FeedEntry {
        id,
        title: decode_html_entities(item.title().unwrap_or_default()).to_string(),
        link,
        summary: decode_html_entities(item.description().unwrap_or_default()).to_string(),
        updated: rss_updated(item).unwrap_or_default(),
        hatena_bookmark_count: hatena_value(item, "bookmarkcount"),
        hatena_comment_list_url: hatena_value(item, "bookmarkcommentlistpageurl"),
        hatena_image_url: hatena_value(item, "imageurl"),
    }
}

/// `dc:date` is already ISO 8601; `pubDate` is RFC 2822 and gets converted.
fn rss_updated(item: &rss::Item) -> Option<String> {
    let dc_date = item
        .dublin_core_ext()
        .and_then(|dc| dc.dates().first().cloned())
        .or_else(|| extension_value(item, &["dc"], "date"));
    if dc_date.is_some() {
        return dc_date;
    }

    item.pub_date().map(|raw| {
        DateTime::parse_from_rfc2822(raw)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|_| raw.to_string())
    })
}

fn hatena_value(item: &rss::Item, name: &str) -> Option<String> {
    extension_value(item, &[HATENA_PREFIX, HATENA_NS], name)
}

/// Text of the first extension element `name` under any of `namespaces`.
/// Element names compare case-insensitively.
fn extension_value(item: &rss::Item, namespaces: &[&str], name: &str) -> Option<String> {
    namespaces
        .iter()
        .filter_map(|ns| item.extensions().get(*ns))
        .flat_map(|elements| elements.iter())
        .find(|(key, _)| {
            let local = key.rsplit(':').next().unwrap_or(key.as_str());
            local.eq_ignore_ascii_case(name)
        })
        .and_then(|(_, values)| values.first())
        .and_then(|ext| ext.value())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn from_feed_rs_entry(entry: feed_rs::model::Entry) -> FeedEntry {
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();
    let id = if entry.id.is_empty() {
        link.clone()
    } else {
        entry.id
    };

    FeedEntry {
        id,
        title: entry
            .title
            .map(|t| decode_html_entities(&t.content).to_string())
            .unwrap_or_default(),
        link,
        summary: entry
            .summary
            .map(|s| decode_html_entities(&s.content).to_string())
            .unwrap_or_default(),
        updated: entry
            .updated
            .or(entry.published)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        hatena_bookmark_count: None,
        hatena_comment_list_url: None,
        hatena_image_url: None,
    }
}
