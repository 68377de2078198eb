//! The login state machine, written against the browser port.
//!
//! The sequence mirrors what an operator does by hand: fill the form, open
//! the captcha, slide the piece into the gap, submit, then wait for the
//! Angular app to persist the token into local storage.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use cems_app::ports::browser::BrowserSession;
use cems_domain::error::CemsError;
use cems_domain::token::AccessToken;

use crate::captcha;
use crate::config::LoginConfig;
use crate::error::LoginError;
use crate::trajectory;

const USERNAME_INPUT: &str = r#"input[formcontrolname="userName"]"#;
const PASSWORD_INPUT: &str = r#"input[formcontrolname="password"]"#;
const CAPTCHA_TRIGGER: &str = ".lodin_yanzheng button";
const CAPTCHA_IMAGE: &str = ".SVdivimg02 img";
const CAPTCHA_CONTAINER: &str = ".SVdivimg02";
const SLIDER_HANDLE: &str = "#SVdivimg04";
const SUBMIT_BUTTON: &str = ".login-form-button";

/// Width the captcha image is generated at. The rendered element scales it,
/// so gap offsets are translated into on-screen pixels before dragging.
const CAPTCHA_SOURCE_WIDTH: f64 = 350.0;

/// The gap's left edge overshoots the piece alignment slightly; the portal
/// accepts the slide when aimed a few pixels short.
const GAP_BIAS: f64 = 5.0;

const CAPTCHA_WAIT: Duration = Duration::from_secs(10);
const CAPTCHA_SETTLE: Duration = Duration::from_secs(1);
const TOKEN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One pass through the portal's login page.
pub(crate) struct LoginFlow<'a> {
    config: &'a LoginConfig,
}

impl<'a> LoginFlow<'a> {
    pub(crate) fn new(config: &'a LoginConfig) -> Self {
        Self { config }
    }

    /// Drive the login sequence to completion on the given session.
    ///
    /// The caller owns the session and must close it regardless of the
    /// outcome.
    pub(crate) async fn run<S: BrowserSession>(
        &self,
        session: &mut S,
    ) -> Result<AccessToken, CemsError> {
        tracing::info!(url = %self.config.login_url, "starting portal login");
        session.navigate(&self.config.login_url).await?;
        session.fill(USERNAME_INPUT, &self.config.username).await?;
        session.fill(PASSWORD_INPUT, &self.config.password).await?;

        session.click(CAPTCHA_TRIGGER).await?;
        session.wait_for_visible(CAPTCHA_IMAGE, CAPTCHA_WAIT).await?;
        // The captcha canvas renders asynchronously after the element shows.
        tokio::time::sleep(CAPTCHA_SETTLE).await;

        let gap = Self::locate_gap(session).await?;
        let container = session.element_rect(CAPTCHA_CONTAINER).await?;
        let distance = (f64::from(gap) - GAP_BIAS) * (container.width / CAPTCHA_SOURCE_WIDTH);

        let handle = session.element_rect(SLIDER_HANDLE).await?;
        let start = handle.center();
        let steps = trajectory::synthesize(start, distance, &mut rand::thread_rng());
        tracing::debug!(gap, distance, "sliding the captcha piece");
        session.drag(start, &steps).await?;
        tokio::time::sleep(CAPTCHA_SETTLE).await;

        session.click(SUBMIT_BUTTON).await?;
        session
            .wait_for_url(&self.config.landing_url, self.config.redirect_timeout())
            .await?;

        self.poll_token(session).await
    }

    async fn locate_gap<S: BrowserSession>(session: &mut S) -> Result<u32, CemsError> {
        let script = format!("document.querySelector('{CAPTCHA_IMAGE}').src");
        let src = session
            .evaluate(&script)
            .await?
            .ok_or(LoginError::CaptchaMissing)?;
        let (_, payload) = src.split_once("base64,").ok_or(LoginError::CaptchaFormat)?;
        let bytes = BASE64.decode(payload).map_err(LoginError::from)?;
        let gap = captcha::locate_gap(&bytes).map_err(LoginError::from)?;
        gap.ok_or_else(|| LoginError::GapNotFound.into())
    }

    async fn poll_token<S: BrowserSession>(
        &self,
        session: &mut S,
    ) -> Result<AccessToken, CemsError> {
        let script = format!(
            "window.localStorage.getItem('{}')",
            self.config.token_key
        );
        for attempt in 0..self.config.token_poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(TOKEN_POLL_INTERVAL).await;
            }
            if let Some(raw) = session.evaluate(&script).await? {
                if !raw.is_empty() {
                    tracing::info!("portal login succeeded");
                    return Ok(AccessToken::new(raw));
                }
            }
        }
        Err(LoginError::TokenMissing.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use cems_app::ports::browser::{DragStep, Rect};

    fn captcha_data_url(gap_x: u32) -> String {
        let mut image = RgbaImage::from_pixel(350, 200, Rgba([90, 120, 150, 255]));
        for y in 60..115 {
            for x in gap_x..gap_x + 55 {
                image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", BASE64.encode(bytes))
    }

    #[derive(Default)]
    struct FakeSession {
        captcha_src: Option<String>,
        token: Option<String>,
        token_ready_after: u32,
        token_polls: u32,
        navigations: Vec<String>,
        fills: Vec<(String, String)>,
        clicks: Vec<String>,
        drags: Vec<((f64, f64), Vec<DragStep>)>,
    }

    impl BrowserSession for FakeSession {
        async fn navigate(&mut self, url: &str) -> Result<(), CemsError> {
            self.navigations.push(url.to_string());
            Ok(())
        }

        async fn fill(&mut self, selector: &str, value: &str) -> Result<(), CemsError> {
            self.fills.push((selector.to_string(), value.to_string()));
            Ok(())
        }

        async fn click(&mut self, selector: &str) -> Result<(), CemsError> {
            self.clicks.push(selector.to_string());
            Ok(())
        }

        async fn wait_for_visible(
            &mut self,
            _selector: &str,
            _timeout: Duration,
        ) -> Result<(), CemsError> {
            Ok(())
        }

        async fn wait_for_url(&mut self, _url: &str, _timeout: Duration) -> Result<(), CemsError> {
            Ok(())
        }

        async fn evaluate(&mut self, script: &str) -> Result<Option<String>, CemsError> {
            if script.contains("localStorage") {
                self.token_polls += 1;
                if self.token_polls > self.token_ready_after {
                    return Ok(self.token.clone());
                }
                return Ok(None);
            }
            Ok(self.captcha_src.clone())
        }

        async fn element_rect(&mut self, selector: &str) -> Result<Rect, CemsError> {
            match selector {
                CAPTCHA_CONTAINER => Ok(Rect {
                    x: 100.0,
                    y: 200.0,
                    width: 350.0,
                    height: 200.0,
                }),
                SLIDER_HANDLE => Ok(Rect {
                    x: 100.0,
                    y: 420.0,
                    width: 40.0,
                    height: 40.0,
                }),
                other => panic!("unexpected rect request: {other}"),
            }
        }

        async fn drag(
            &mut self,
            start: (f64, f64),
            steps: &[DragStep],
        ) -> Result<(), CemsError> {
            self.drags.push((start, steps.to_vec()));
            Ok(())
        }

        async fn close(self) {}
    }

    fn config() -> LoginConfig {
        toml::from_str(
            r"
                login_url = 'http://portal.example/login'
                landing_url = 'http://portal.example/home'
                username = 'operator'
                password = 'hunter2'
            ",
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn should_log_in_and_extract_token() {
        let mut session = FakeSession {
            captcha_src: Some(captcha_data_url(120)),
            token: Some("tok-xyz".to_string()),
            ..FakeSession::default()
        };
        let config = config();

        let token = LoginFlow::new(&config).run(&mut session).await.unwrap();
        assert_eq!(token.as_str(), "tok-xyz");

        assert_eq!(session.navigations, vec!["http://portal.example/login"]);
        assert_eq!(
            session.fills,
            vec![
                (USERNAME_INPUT.to_string(), "operator".to_string()),
                (PASSWORD_INPUT.to_string(), "hunter2".to_string()),
            ]
        );
        assert_eq!(
            session.clicks,
            vec![CAPTCHA_TRIGGER.to_string(), SUBMIT_BUTTON.to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_scale_drag_to_rendered_captcha_width() {
        let mut session = FakeSession {
            captcha_src: Some(captcha_data_url(120)),
            token: Some("tok".to_string()),
            ..FakeSession::default()
        };
        let config = config();

        LoginFlow::new(&config).run(&mut session).await.unwrap();

        // Slider handle center is (120, 440); container renders 1:1, so the
        // piece travels (120 - 5) * 1.0 = 115 pixels.
        let (start, steps) = &session.drags[0];
        assert_eq!(*start, (120.0, 440.0));
        let last = steps.last().unwrap();
        assert!((last.x - 235.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn should_fail_when_captcha_src_is_missing() {
        let mut session = FakeSession {
            token: Some("tok".to_string()),
            ..FakeSession::default()
        };
        let config = config();

        let err = LoginFlow::new(&config).run(&mut session).await.unwrap_err();
        assert!(matches!(err, CemsError::Login(_)));
        assert!(session.drags.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_fail_when_no_gap_is_found() {
        // Fully opaque captcha: nothing to slide into.
        let mut image_bytes = Vec::new();
        RgbaImage::from_pixel(350, 200, Rgba([90, 120, 150, 255]))
            .write_to(&mut Cursor::new(&mut image_bytes), ImageFormat::Png)
            .unwrap();
        let mut session = FakeSession {
            captcha_src: Some(format!(
                "data:image/png;base64,{}",
                BASE64.encode(image_bytes)
            )),
            token: Some("tok".to_string()),
            ..FakeSession::default()
        };
        let config = config();

        let err = LoginFlow::new(&config).run(&mut session).await.unwrap_err();
        assert!(matches!(err, CemsError::Login(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_give_up_when_token_never_appears() {
        let mut session = FakeSession {
            captcha_src: Some(captcha_data_url(120)),
            token: None,
            ..FakeSession::default()
        };
        let config = config();

        let err = LoginFlow::new(&config).run(&mut session).await.unwrap_err();
        assert!(matches!(err, CemsError::Login(_)));
        assert_eq!(session.token_polls, config.token_poll_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_until_token_appears() {
        let mut session = FakeSession {
            captcha_src: Some(captcha_data_url(120)),
            token: Some("late-token".to_string()),
            token_ready_after: 3,
            ..FakeSession::default()
        };
        let config = config();

        let token = LoginFlow::new(&config).run(&mut session).await.unwrap();
        assert_eq!(token.as_str(), "late-token");
        assert_eq!(session.token_polls, 4);
    }
}
