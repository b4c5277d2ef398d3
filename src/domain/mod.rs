pub mod bookmark;
pub mod entry;
pub mod feed_entry;
pub mod tag;
pub mod user;

pub use bookmark::Bookmark;
pub use entry::{Entry, EntryLookup, NotFoundEntry};
pub use feed_entry::FeedEntry;
pub use tag::{Tag, Tags};
pub use user::UserInfo;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::app::HatebError;

/// An absolute `http`/`https` URL.
///
/// Records that carry links hold this instead of a bare string, so a response
/// with a malformed link fails to decode rather than producing a record that
/// points nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HttpUrl(Url);

impl HttpUrl {
    pub fn parse(input: &str) -> Result<Self, HatebError> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(HatebError::Validation(format!(
                "URL scheme must be http or https, got {other}: {input}"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for HttpUrl {
    type Error = HatebError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HttpUrl> for String {
    fn from(value: HttpUrl) -> Self {
        value.0.into()
    }
}

impl fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Treat an explicit JSON `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Entry ids come back as strings from some endpoints and numbers from others.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
