//! WebDriver implementation of the [`LoginAutomator`](cems_app::ports::login::LoginAutomator) port.
//!
//! The portal has no login API; the only way to obtain an access token is to
//! drive its Angular login page in a real browser: fill the credential form,
//! solve the slider captcha, and read the token the page writes to local
//! storage.
//!
//! Responsibilities:
//! - locate the puzzle gap in the captcha image (`captcha`);
//! - synthesize a human-looking drag trajectory (`trajectory`);
//! - run the login state machine against the browser port (`flow`);
//! - back the browser port with a fantoccini WebDriver session
//!   (`webdriver`).

mod captcha;
mod config;
mod error;
mod flow;
mod trajectory;
mod webdriver;

pub use config::LoginConfig;
pub use error::LoginError;
pub use webdriver::WebDriverLoginAutomator;
