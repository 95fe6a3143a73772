//! Abstract page driver: the capability boundary to the live game page.
//!
//! The orchestrator only sees this trait — read access to visible elements,
//! write access via coordinate clicks, plus screenshot/markup capture. The
//! real implementation is [`crate::browser::ChromiumSession`]; [`MockPage`]
//! drives the orchestrator in unit tests without a browser.

use crate::observe::VisibleElement;
use crate::result::{RejugarError, RejugarResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One live game page, exclusively owned by one attempt
#[async_trait]
pub trait GamePage: Send {
    /// Navigate to a URL and wait for the page to become ready
    async fn navigate(&mut self, url: &str, timeout: Duration) -> RejugarResult<()>;

    /// Snapshot all visible interactive elements
    async fn visible_elements(&self) -> RejugarResult<Vec<VisibleElement>>;

    /// Click at page coordinates
    async fn click_at(&self, x: f64, y: f64) -> RejugarResult<()>;

    /// Capture a full-page PNG screenshot
    async fn screenshot(&self) -> RejugarResult<Vec<u8>>;

    /// Full page markup
    async fn content(&self) -> RejugarResult<String>;

    /// Release the underlying session resources
    async fn close(&mut self) -> RejugarResult<()>;
}

/// Produces one isolated page session per attempt.
///
/// Sessions are never shared or reused: every attempt opens a fresh one and
/// tears it down on exit. A factory failure means the environment (not the
/// game) is broken and is fatal to the whole run.
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// The page type this factory opens
    type Page: GamePage;

    /// Open a fresh session
    async fn open(&self) -> RejugarResult<Self::Page>;
}

// ============================================================================
// Mock implementation for unit testing
// ============================================================================

/// Scripted page for unit-testing the orchestrator
///
/// Element snapshots are consumed in order, with the last one repeating once
/// the script runs out (a page keeps answering queries after the game stops
/// changing). A call history records every interaction for verification.
#[derive(Debug, Default)]
pub struct MockPage {
    snapshots: Mutex<VecDeque<Vec<VisibleElement>>>,
    html: String,
    screenshot_data: Vec<u8>,
    nav_failure: Option<String>,
    interaction_delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPage {
    /// Create an empty mock page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an element snapshot
    #[must_use]
    pub fn with_snapshot(self, elements: Vec<VisibleElement>) -> Self {
        self.snapshots.lock().unwrap().push_back(elements);
        self
    }

    /// Set the markup returned by [`GamePage::content`]
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Set screenshot bytes
    #[must_use]
    pub fn with_screenshot(mut self, data: Vec<u8>) -> Self {
        self.screenshot_data = data;
        self
    }

    /// Make navigation fail with the given message
    #[must_use]
    pub fn with_nav_failure(mut self, message: impl Into<String>) -> Self {
        self.nav_failure = Some(message.into());
        self
    }

    /// Delay every interaction (for exercising attempt deadlines)
    #[must_use]
    pub fn with_interaction_delay(mut self, delay: Duration) -> Self {
        self.interaction_delay = delay;
        self
    }

    /// Handle to the call history, valid after the page is consumed
    #[must_use]
    pub fn calls_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

/// Check whether a recorded call history contains a call with this prefix
#[must_use]
pub fn history_contains(calls: &Arc<Mutex<Vec<String>>>, prefix: &str) -> bool {
    calls.lock().unwrap().iter().any(|c| c.starts_with(prefix))
}

#[async_trait]
impl GamePage for MockPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> RejugarResult<()> {
        tokio::time::sleep(self.interaction_delay).await;
        self.record(format!("navigate:{url}"));
        match &self.nav_failure {
            Some(message) => Err(RejugarError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn visible_elements(&self) -> RejugarResult<Vec<VisibleElement>> {
        tokio::time::sleep(self.interaction_delay).await;
        self.record("visible_elements");
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            Ok(snapshots.pop_front().unwrap_or_default())
        } else {
            Ok(snapshots.front().cloned().unwrap_or_default())
        }
    }

    async fn click_at(&self, x: f64, y: f64) -> RejugarResult<()> {
        tokio::time::sleep(self.interaction_delay).await;
        self.record(format!("click:{x:.0},{y:.0}"));
        Ok(())
    }

    async fn screenshot(&self) -> RejugarResult<Vec<u8>> {
        tokio::time::sleep(self.interaction_delay).await;
        self.record("screenshot");
        Ok(self.screenshot_data.clone())
    }

    async fn content(&self) -> RejugarResult<String> {
        tokio::time::sleep(self.interaction_delay).await;
        self.record("content");
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> RejugarResult<()> {
        self.record("close");
        Ok(())
    }
}

/// Factory handing out pre-built mock pages, one per attempt
#[derive(Debug, Default)]
pub struct MockFactory {
    pages: Mutex<VecDeque<MockPage>>,
}

impl MockFactory {
    /// Create an empty factory; opens blank pages once the queue runs dry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page for the next `open` call
    pub fn push(&self, page: MockPage) {
        self.pages.lock().unwrap().push_back(page);
    }
}

#[async_trait]
impl PageFactory for MockFactory {
    type Page = MockPage;

    async fn open(&self) -> RejugarResult<Self::Page> {
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}
