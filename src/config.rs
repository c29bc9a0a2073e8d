use blog_common::posts::UserId;
use std::env::var;

pub const DEFAULT_API_URL: &str = "http://localhost:8888";

pub struct Config {
    /// Scheme, host and port of the blog API.
    pub api_url: String,
    /// Author of the posts written from this machine.
    pub user_id: UserId,
}

impl Config {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Config {
        Config {
            api_url: lookup("BLOG_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_owned())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            user_id: UserId::from_session(lookup("BLOG_USER_ID")),
        }
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::from_lookup(|name| var(name).ok());
}
