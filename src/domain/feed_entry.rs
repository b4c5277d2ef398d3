use serde::{Deserialize, Serialize};

/// One item from a bookmark search feed.
///
/// The `hatena_*` fields come from the `hatena:` namespace and are `None` when
/// the item does not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    /// ISO 8601 timestamp.
    pub updated: String,
    #[serde(rename = "hatena_bookmarkcount")]
    pub hatena_bookmark_count: Option<String>,
    #[serde(rename = "hatena_bookmarkcommentlistpageurl")]
    pub hatena_comment_list_url: Option<String>,
    #[serde(rename = "hatena_imageurl")]
    pub hatena_image_url: Option<String>,
}

impl FeedEntry {
    /// Key used to drop repeated items across pages.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.id, &self.link)
    }

    pub fn bookmark_count(&self) -> Option<u64> {
        self.hatena_bookmark_count
            .as_deref()
            .and_then(|c| c.trim().parse().ok())
    }
}
