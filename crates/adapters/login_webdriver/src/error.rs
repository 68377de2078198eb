//! Typed failures of the browser-driven login.

use cems_domain::error::CemsError;

/// Everything that can go wrong between opening the login page and reading
/// the token out of local storage.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The WebDriver endpoint refused the session.
    #[error("could not open a webdriver session")]
    Connect(#[from] fantoccini::error::NewSessionError),

    /// A browser command failed mid-flow.
    #[error("webdriver command failed")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// The captcha image never exposed a `src` attribute.
    #[error("captcha image source is not available")]
    CaptchaMissing,

    /// The captcha `src` was not a base64 data URL.
    #[error("captcha image is not a base64 data url")]
    CaptchaFormat,

    /// The captcha payload was not valid base64.
    #[error("captcha payload is not valid base64")]
    CaptchaEncoding(#[from] base64::DecodeError),

    /// The captcha bytes did not decode as an image.
    #[error("captcha image could not be decoded")]
    CaptchaDecode(#[from] image::ImageError),

    /// No region of the captcha looked like the puzzle gap.
    #[error("no slider gap found in the captcha image")]
    GapNotFound,

    /// The portal never redirected to the landing page after the slide.
    #[error("portal did not redirect after login")]
    RedirectTimeout,

    /// The landing page loaded but never wrote a token to local storage.
    #[error("token did not appear in local storage")]
    TokenMissing,
}

impl From<LoginError> for CemsError {
    fn from(err: LoginError) -> Self {
        Self::login(err)
    }
}
