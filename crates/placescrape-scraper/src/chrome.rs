//! Chrome DevTools implementation of [`PageSession`].
//!
//! One browser process and one tab are shared by the whole run. The
//! chromiumoxide event handler runs on a spawned task that is aborted when
//! the session is dropped, so Chrome is released on every exit path.

use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use placescrape_core::BrowserOptions;
use tokio::task::JoinHandle;

use crate::error::ScraperError;
use crate::page::PageSession;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CLICK_JS: &str = "function() { this.click(); }";

const VISIBLE_JS: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}";

const CLICKABLE_JS: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none'
        && style.pointerEvents !== 'none'
        && !this.disabled && this.getAttribute('aria-disabled') !== 'true';
}";

pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    wait_timeout: Duration,
    closed: bool,
}

impl ChromeSession {
    /// Launch Chrome and open the tab used for the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Launch`] if the browser config is invalid,
    /// the executable cannot be started, or the first tab cannot be opened.
    pub async fn launch(options: &BrowserOptions) -> Result<Self, ScraperError> {
        let (width, height) = options.window_size;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .request_timeout(REQUEST_TIMEOUT)
            .arg(format!("--user-agent={}", options.user_agent))
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser event handler error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScraperError::Launch(format!("failed to open tab: {e}")));
            }
        };

        tracing::info!(headless = options.headless, "browser session started");

        Ok(Self {
            browser,
            handler,
            page,
            wait_timeout: options.wait_timeout,
            closed: false,
        })
    }

    /// Close the browser and wait for the process to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Cdp`] if the close command fails. The handler
    /// task is aborted either way when `self` is dropped.
    pub async fn close(mut self) -> Result<(), ScraperError> {
        self.closed = true;
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "browser process did not exit cleanly");
        }
        tracing::info!("browser session closed");
        Ok(())
    }

    async fn wait_for_document_ready(&self) -> bool {
        let start = Instant::now();
        loop {
            if let Ok(result) = self.page.evaluate("document.readyState").await {
                if result.value().and_then(serde_json::Value::as_str) == Some("complete") {
                    return true;
                }
            }
            if start.elapsed() >= self.wait_timeout {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn check(element: &Element, predicate_js: &str) -> bool {
        match element.call_js_fn(predicate_js, false).await {
            Ok(returns) => returns
                .result
                .value
                .as_ref()
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Poll for the first match of `selector` until `predicate_js` holds.
    /// Lookup errors while polling count as "not yet".
    async fn wait_until(
        &self,
        selector: &str,
        timeout: Duration,
        predicate_js: &str,
    ) -> Option<Element> {
        let start = Instant::now();
        loop {
            if let Ok(elements) = self.page.find_elements(selector).await {
                if let Some(element) = elements.into_iter().next() {
                    if Self::check(&element, predicate_js).await {
                        return Some(element);
                    }
                }
            }
            if start.elapsed() >= timeout {
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();
        if !self.closed {
            tracing::warn!("browser session dropped without close; killing browser");
        }
    }
}

impl PageSession for ChromeSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| ScraperError::Navigation {
            url: url.to_owned(),
            reason: e.to_string(),
        };
        self.page.goto(url).await.map_err(navigation_error)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(navigation_error)?;
        if !self.wait_for_document_ready().await {
            tracing::debug!(url, "document not complete before timeout; continuing");
        }
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Vec<Element>, ScraperError> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn find_within(
        &self,
        element: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, ScraperError> {
        Ok(element.find_elements(selector).await?)
    }

    async fn text(&self, element: &Element) -> Result<String, ScraperError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>, ScraperError> {
        Ok(element.attribute(name).await?)
    }

    async fn click_via_script(&self, element: &Element) -> Result<(), ScraperError> {
        element.call_js_fn(CLICK_JS, false).await?;
        Ok(())
    }

    async fn wait_until_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Element>, ScraperError> {
        Ok(self.wait_until(selector, timeout, CLICKABLE_JS).await)
    }

    async fn wait_until_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Element>, ScraperError> {
        Ok(self.wait_until(selector, timeout, VISIBLE_JS).await)
    }
}
