use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{null_as_default, opt_string_or_number, HttpUrl};

/// A user's bookmark on one URL, as returned by `rest/1/my/bookmark`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub comment: String,
    pub created_datetime: DateTime<FixedOffset>,
    pub created_epoch: i64,
    pub user: String,
    pub permalink: HttpUrl,
    pub private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub eid: Option<String>,
    #[serde(default)]
    pub comment_raw: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favorites: Vec<serde_json::Value>,
}
