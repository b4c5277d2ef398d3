use crate::api::HatenaBookmarkClient;
use crate::app::error::{HatebError, Result};
use crate::auth::OAuth1Signer;
use crate::config::Config;
use crate::search::FeedSearchClient;

/// The four OAuth secrets issued for an application and user.
#[derive(Clone, Default)]
pub struct Credentials {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
}

impl Credentials {
    fn signer(&self) -> Result<OAuth1Signer> {
        let field = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| HatebError::Config(format!("Missing credential: {name}")))
        };

        Ok(OAuth1Signer::new(
            field(&self.consumer_key, "consumer key")?,
            field(&self.consumer_secret, "consumer secret")?,
            field(&self.access_token, "access token")?,
            field(&self.access_token_secret, "access token secret")?,
        ))
    }
}

pub struct AppContext {
    pub config: Config,
    pub search: FeedSearchClient,
    credentials: Credentials,
}

impl AppContext {
    pub fn new(config: Config, credentials: Credentials) -> Result<Self> {
        let search = FeedSearchClient::from_config(&config.search)?;

        Ok(Self {
            config,
            search,
            credentials,
        })
    }

    /// REST client for commands that act on the user's account.
    ///
    /// Built on demand so that search works without credentials.
    pub fn api(&self) -> Result<HatenaBookmarkClient> {
        let signer = self.credentials.signer()?;
        HatenaBookmarkClient::with_config(signer, &self.config.api)
    }
}
