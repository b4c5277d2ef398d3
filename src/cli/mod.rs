pub mod commands;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::app::Credentials;
use crate::search::{SearchType, SortOrder};

#[derive(Parser)]
#[command(name = "hatebu")]
#[command(about = "Hatena Bookmark API and search client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// OAuth credentials; only needed for account commands.
#[derive(Args)]
pub struct CredentialArgs {
    #[arg(long, env = "HATENA_CONSUMER_KEY", global = true, hide_env_values = true)]
    pub consumer_key: Option<String>,

    #[arg(long, env = "HATENA_CONSUMER_SECRET", global = true, hide_env_values = true)]
    pub consumer_secret: Option<String>,

    #[arg(long, env = "HATENA_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "HATENA_ACCESS_TOKEN_SECRET", global = true, hide_env_values = true)]
    pub access_token_secret: Option<String>,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Credentials {
            consumer_key: args.consumer_key,
            consumer_secret: args.consumer_secret,
            access_token: args.access_token,
            access_token_secret: args.access_token_secret,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read, write or delete your bookmark on a URL
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Show public bookmark data for a URL
    Entry {
        url: String,
    },
    /// List your tags
    Tags,
    /// Show your account settings
    User,
    /// Bookmark counts for one or more URLs (at most 50)
    Count {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Search bookmarks through the public search feed
    Search(SearchArgs),
}

#[derive(Subcommand)]
pub enum BookmarkAction {
    /// Show your bookmark on a URL
    Get { url: String },
    /// Create or replace your bookmark on a URL
    Add {
        url: String,

        #[arg(short, long, default_value = "")]
        comment: String,

        /// Tag to attach; repeat for several
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        private: bool,

        #[arg(long)]
        post_twitter: bool,

        #[arg(long)]
        post_mixi: bool,

        #[arg(long)]
        post_evernote: bool,
    },
    /// Delete your bookmark on a URL
    Delete { url: String },
}

#[derive(Args)]
pub struct SearchArgs {
    pub query: String,

    /// What to match: text, tag or title
    #[arg(short = 't', long = "type", default_value = "text")]
    pub search_type: SearchType,

    /// recent or popular
    #[arg(short, long, default_value = "recent")]
    pub sort: SortOrder,

    /// Only entries with at least this many bookmarks
    #[arg(short, long)]
    pub users: Option<u32>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub date_begin: Option<NaiveDate>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub date_end: Option<NaiveDate>,

    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Pages of 40 entries to fetch (default from config)
    #[arg(short, long)]
    pub max_pages: Option<usize>,
}
