//! Login automation configuration.

use std::time::Duration;

use serde::Deserialize;

fn default_webdriver_url() -> String {
    "http://127.0.0.1:9515".to_string()
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_token_poll_attempts() -> u32 {
    5
}

fn default_redirect_timeout_secs() -> u64 {
    10
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    concat!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
        "(KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36"
    )
    .to_string()
}

/// Configuration for the WebDriver login automator.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    /// Chromedriver endpoint to open sessions against.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// URL of the portal's login page.
    pub login_url: String,
    /// URL prefix the portal redirects to after a successful login.
    pub landing_url: String,
    /// Portal account name.
    pub username: String,
    /// Portal account password.
    pub password: String,
    /// Local-storage key the landing page writes the token under.
    #[serde(default = "default_token_key")]
    pub token_key: String,
    /// How many one-second polls to give the token to appear.
    #[serde(default = "default_token_poll_attempts")]
    pub token_poll_attempts: u32,
    /// How long to wait for the post-login redirect, in seconds.
    #[serde(default = "default_redirect_timeout_secs")]
    pub redirect_timeout_secs: u64,
    /// Run the browser headless. The slider works fine without a display.
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Browser user agent; must match the one the data client sends.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl LoginConfig {
    /// Redirect timeout as a [`Duration`].
    #[must_use]
    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.redirect_timeout_secs)
    }
}
