use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub plususer: bool,
    pub private: bool,
    pub is_oauth_twitter: bool,
    pub is_oauth_evernote: bool,
    pub is_oauth_facebook: bool,
    pub is_oauth_mixi_check: bool,
}
