//! Browser port — the primitives the login flow is written against.
//!
//! The login state machine only ever talks to this trait, so it can be
//! exercised in tests with a scripted fake session while production wires in
//! a real WebDriver-backed implementation.

use std::future::Future;
use std::time::Duration;

use cems_domain::error::CemsError;

/// Position and size of a rendered element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One intermediate pointer position in a synthesized drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    /// Absolute horizontal position.
    pub x: f64,
    /// Absolute vertical position.
    pub y: f64,
    /// Pause before moving to this position.
    pub pause: Duration,
}

/// A live browser session.
///
/// Implementations own the underlying browser resource; callers must invoke
/// [`close`](Self::close) on every exit path, including failures.
pub trait BrowserSession: Send {
    /// Navigate to a URL and wait for the page to load.
    fn navigate(&mut self, url: &str) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Type `value` into the element matching the CSS selector.
    fn fill(
        &mut self,
        selector: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Click the element matching the CSS selector.
    fn click(&mut self, selector: &str) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Block until the element matching the selector is present and visible.
    fn wait_for_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Block until the browser has navigated to `url`.
    fn wait_for_url(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Evaluate a JavaScript expression, returning its string value
    /// (`None` when the expression evaluates to `null`/`undefined`).
    fn evaluate(
        &mut self,
        script: &str,
    ) -> impl Future<Output = Result<Option<String>, CemsError>> + Send;

    /// Bounding box of the element matching the CSS selector.
    fn element_rect(
        &mut self,
        selector: &str,
    ) -> impl Future<Output = Result<Rect, CemsError>> + Send;

    /// Press the pointer at `start`, replay `steps`, and release.
    fn drag(
        &mut self,
        start: (f64, f64),
        steps: &[DragStep],
    ) -> impl Future<Output = Result<(), CemsError>> + Send;

    /// Release the browser resource. Best-effort; never fails the caller.
    fn close(self) -> impl Future<Output = ()> + Send;
}
