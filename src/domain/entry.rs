use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, string_or_number, HttpUrl};
use crate::app::{HatebError, Result};

/// Aggregate bookmark metadata for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub count: u64,
    pub is_invalid_url: bool,
    pub has_asin: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub smartphone_app_entry_url: String,
    pub entry_url: HttpUrl,
    #[serde(deserialize_with = "string_or_number")]
    pub eid: String,
    pub root_url: HttpUrl,
    pub favicon_url: HttpUrl,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title_last_editor: String,
    pub url: HttpUrl,
}

/// Returned by the entry endpoint for pages nobody has bookmarked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFoundEntry {
    pub message: String,
    pub title: String,
    pub favicon_url: HttpUrl,
    pub url: HttpUrl,
}

/// Result of an entry lookup. Both variants share one endpoint and one raw
/// JSON shape; a truthy `message` field marks the not-found variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntryLookup {
    Found(Entry),
    NotFound(NotFoundEntry),
}

impl EntryLookup {
    pub fn from_value(value: Value) -> Result<Self> {
        if has_message(&value) {
            serde_json::from_value(value)
                .map(EntryLookup::NotFound)
                .map_err(|e| HatebError::decode("not-found entry", e))
        } else {
            serde_json::from_value(value)
                .map(EntryLookup::Found)
                .map_err(|e| HatebError::decode("entry", e))
        }
    }

    pub fn found(&self) -> Option<&Entry> {
        match self {
            EntryLookup::Found(entry) => Some(entry),
            EntryLookup::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, EntryLookup::Found(_))
    }
}

fn has_message(value: &Value) -> bool {
    match value.get("message") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
