//! Fantoccini-backed implementation of the browser port.

use std::time::Duration;

use fantoccini::actions::{InputSource as _, MOUSE_BUTTON_LEFT, MouseActions, PointerAction};
use fantoccini::{Client, ClientBuilder, Locator};
use tokio::time::Instant;

use cems_app::ports::browser::{BrowserSession, DragStep, Rect};
use cems_app::ports::login::LoginAutomator;
use cems_domain::error::CemsError;
use cems_domain::token::AccessToken;

use crate::config::LoginConfig;
use crate::error::LoginError;
use crate::flow::LoginFlow;

const URL_POLL_INTERVAL: Duration = Duration::from_millis(250);

fn wrap(err: fantoccini::error::CmdError) -> CemsError {
    LoginError::WebDriver(err).into()
}

/// A live chromedriver session.
pub(crate) struct FantocciniSession {
    client: Client,
}

impl FantocciniSession {
    /// Open a new browser session against the configured WebDriver endpoint.
    pub(crate) async fn connect(config: &LoginConfig) -> Result<Self, CemsError> {
        let mut args = vec![
            format!("--user-agent={}", config.user_agent),
            "--window-size=1440,900".to_string(),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&config.webdriver_url)
            .await
            .map_err(LoginError::from)?;
        Ok(Self { client })
    }
}

impl BrowserSession for FantocciniSession {
    async fn navigate(&mut self, url: &str) -> Result<(), CemsError> {
        self.client.goto(url).await.map_err(wrap)
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), CemsError> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(wrap)?;
        element.send_keys(value).await.map_err(wrap)
    }

    async fn click(&mut self, selector: &str) -> Result<(), CemsError> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(wrap)?;
        element.click().await.map_err(wrap)
    }

    async fn wait_for_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), CemsError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map(drop)
            .map_err(wrap)
    }

    async fn wait_for_url(&mut self, url: &str, timeout: Duration) -> Result<(), CemsError> {
        let deadline = Instant::now() + timeout;
        loop {
            let current = self.client.current_url().await.map_err(wrap)?;
            if current.as_str().starts_with(url) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(LoginError::RedirectTimeout.into());
            }
            tokio::time::sleep(URL_POLL_INTERVAL).await;
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Option<String>, CemsError> {
        let value = self
            .client
            .execute(&format!("return {script};"), Vec::new())
            .await
            .map_err(wrap)?;
        Ok(match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(raw) => Some(raw),
            other => Some(other.to_string()),
        })
    }

    async fn element_rect(&mut self, selector: &str) -> Result<Rect, CemsError> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(wrap)?;
        let (x, y, width, height) = element.rectangle().await.map_err(wrap)?;
        Ok(Rect {
            x,
            y,
            width,
            height,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn drag(&mut self, start: (f64, f64), steps: &[DragStep]) -> Result<(), CemsError> {
        let mut mouse = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveTo {
                duration: None,
                x: start.0.round() as i64,
                y: start.1.round() as i64,
            })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            });

        for step in steps {
            mouse = mouse
                .then(PointerAction::Pause {
                    duration: step.pause,
                })
                .then(PointerAction::MoveTo {
                    duration: Some(Duration::from_millis(5)),
                    x: step.x.round() as i64,
                    y: step.y.round() as i64,
                });
        }
        mouse = mouse.then(PointerAction::Up {
            button: MOUSE_BUTTON_LEFT,
        });

        self.client.perform_actions(mouse).await.map_err(wrap)
    }

    async fn close(self) {
        if let Err(err) = self.client.close().await {
            tracing::warn!(%err, "failed to close the browser session");
        }
    }
}

/// [`LoginAutomator`] that opens a fresh browser per attempt.
///
/// One attempt, one session: the browser is always closed before the result
/// propagates, so a failed attempt never leaks a chromedriver process.
pub struct WebDriverLoginAutomator {
    config: LoginConfig,
}

impl WebDriverLoginAutomator {
    #[must_use]
    pub fn new(config: LoginConfig) -> Self {
        Self { config }
    }
}

impl LoginAutomator for WebDriverLoginAutomator {
    async fn acquire_token(&self) -> Result<AccessToken, CemsError> {
        let mut session = FantocciniSession::connect(&self.config).await?;
        let result = LoginFlow::new(&self.config).run(&mut session).await;
        session.close().await;
        result
    }
}
