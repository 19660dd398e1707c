//! The rendering capability the scraper drives.
//!
//! Implementations own a single browser tab. Lookups that find nothing
//! return empty results; waits that time out return `Ok(None)`. `Err` is
//! reserved for failures of the session itself.

use std::time::Duration;

use crate::error::ScraperError;

#[allow(async_fn_in_trait)]
pub trait PageSession {
    type Element;

    /// Load `url` and wait until the document has finished loading.
    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    /// All elements matching `selector` in document order.
    async fn find(&self, selector: &str) -> Result<Vec<Self::Element>, ScraperError>;

    /// All descendants of `element` matching `selector` in document order.
    async fn find_within(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, ScraperError>;

    /// Rendered text of `element`, untrimmed.
    async fn text(&self, element: &Self::Element) -> Result<String, ScraperError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// Click through a script call on the element, bypassing overlays that
    /// would intercept a native click.
    async fn click_via_script(&self, element: &Self::Element) -> Result<(), ScraperError>;

    /// First element matching `selector` once it is clickable, or `None`
    /// when `timeout` elapses first.
    async fn wait_until_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, ScraperError>;

    /// First element matching `selector` once it is visible, or `None`
    /// when `timeout` elapses first.
    async fn wait_until_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Self::Element>, ScraperError>;
}
