//! Chromium-backed page sessions via the Chrome DevTools Protocol.
//!
//! Each attempt gets its own freshly launched browser with one page; the
//! session is torn down unconditionally when the attempt exits. Element
//! observation goes through one generic JS evaluation (see
//! [`crate::observe`]); clicks are dispatched as raw CDP mouse events at
//! coordinates, so no game-specific selectors ever reach the wire.

use crate::driver::{GamePage, PageFactory};
use crate::observe::{self, VisibleElement};
use crate::result::{RejugarError, RejugarResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::time::{Duration, Instant};

/// Poll interval while waiting for `document.readyState`
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// One live browser + page, exclusively owned by one attempt
#[derive(Debug)]
pub struct ChromiumSession {
    browser: CdpBrowser,
    page: CdpPage,
    handler: tokio::task::JoinHandle<()>,
}

impl ChromiumSession {
    /// Launch a fresh browser and open a blank page
    ///
    /// # Errors
    ///
    /// Returns [`RejugarError::BrowserNotFound`] when the configured
    /// executable does not exist; any other launch failure is an
    /// environment failure and fatal to the whole run.
    pub async fn launch(config: &BrowserConfig) -> RejugarResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            if !std::path::Path::new(path).exists() {
                return Err(RejugarError::BrowserNotFound);
            }
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| RejugarError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| RejugarError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        // Drive the CDP event stream for the lifetime of the session
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RejugarError::page(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    async fn dispatch_mouse(
        &self,
        kind: DispatchMouseEventType,
        x: f64,
        y: f64,
    ) -> RejugarResult<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(|e| RejugarError::input(e.to_string()))?;

        self.page
            .execute(params)
            .await
            .map_err(|e| RejugarError::input(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl GamePage for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> RejugarResult<()> {
        let started = Instant::now();
        let timeout_ms = timeout.as_millis() as u64;

        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| RejugarError::Timeout { ms: timeout_ms })?
            .map_err(|e| RejugarError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        // Settle on readyState within the remaining navigation budget
        loop {
            let state: String = self
                .page
                .evaluate("document.readyState")
                .await
                .map_err(|e| RejugarError::evaluation(e.to_string()))?
                .into_value()
                .unwrap_or_default();

            if state == "complete" {
                return Ok(());
            }

            if started.elapsed() >= timeout {
                return Err(RejugarError::Timeout { ms: timeout_ms });
            }

            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn visible_elements(&self) -> RejugarResult<Vec<VisibleElement>> {
        let payload: String = self
            .page
            .evaluate(observe::ELEMENT_SNAPSHOT_JS)
            .await
            .map_err(|e| RejugarError::evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| RejugarError::evaluation(e.to_string()))?;

        Ok(serde_json::from_str(&payload)?)
    }

    async fn click_at(&self, x: f64, y: f64) -> RejugarResult<()> {
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, x, y)
            .await?;
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, x, y)
            .await
    }

    async fn screenshot(&self) -> RejugarResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| RejugarError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| RejugarError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn content(&self) -> RejugarResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| RejugarError::page(e.to_string()))
    }

    async fn close(&mut self) -> RejugarResult<()> {
        let result = self
            .browser
            .close()
            .await
            .map_err(|e| RejugarError::page(e.to_string()));
        self.handler.abort();
        result.map(|_| ())
    }
}

/// Factory launching a fresh Chromium session per attempt
#[derive(Debug, Clone)]
pub struct ChromiumFactory {
    config: BrowserConfig,
}

impl ChromiumFactory {
    /// Create a factory with the given browser configuration
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Get the browser configuration
    #[must_use]
    pub const fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

#[async_trait]
impl PageFactory for ChromiumFactory {
    type Page = ChromiumSession;

    async fn open(&self) -> RejugarResult<Self::Page> {
        ChromiumSession::launch(&self.config).await
    }
}
