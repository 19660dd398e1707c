//! "Show more" expansion for lazily loaded lists.
//!
//! Naver Place renders menus and reviews in batches and appends the next
//! batch when the reveal control at the bottom of the list is clicked. The
//! driver clicks until the control stops becoming clickable within the wait
//! timeout, or until the iteration cap is hit. Either way the list is left
//! in whatever state it reached; expansion never fails the store.

use std::time::Duration;

use placescrape_core::ExpansionReport;

use crate::page::PageSession;

#[derive(Debug, Clone, Copy)]
pub struct PaginationDriver {
    wait_timeout: Duration,
    settle_delay: Duration,
}

impl PaginationDriver {
    /// `wait_timeout` bounds each wait for the control; `settle_delay` is
    /// slept after every click so the appended batch can render.
    #[must_use]
    pub fn new(wait_timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            wait_timeout,
            settle_delay,
        }
    }

    /// Click `reveal_selector` until it is gone or `max_iterations` clicks
    /// have been made. `None` and `Some(0)` both mean no cap.
    pub async fn expand<P: PageSession>(
        &self,
        page: &P,
        reveal_selector: &str,
        max_iterations: Option<u32>,
    ) -> ExpansionReport {
        let cap = max_iterations.filter(|&n| n > 0);
        let mut iterations = 0u32;

        loop {
            if cap.is_some_and(|cap| iterations >= cap) {
                tracing::debug!(reveal_selector, iterations, "expansion stopped at iteration cap");
                return ExpansionReport::capped(iterations);
            }

            let control = match page
                .wait_until_clickable(reveal_selector, self.wait_timeout)
                .await
            {
                Ok(Some(control)) => control,
                Ok(None) => {
                    tracing::debug!(reveal_selector, iterations, "reveal control gone; list exhausted");
                    return ExpansionReport::exhausted(iterations);
                }
                Err(e) => {
                    tracing::debug!(
                        reveal_selector,
                        iterations,
                        error = %e,
                        "waiting for reveal control failed; treating list as exhausted"
                    );
                    return ExpansionReport::exhausted(iterations);
                }
            };

            if let Err(e) = page.click_via_script(&control).await {
                tracing::warn!(
                    reveal_selector,
                    iterations,
                    error = %e,
                    "reveal control click failed; stopping expansion"
                );
                return ExpansionReport::exhausted(iterations);
            }

            iterations += 1;
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use placescrape_core::Termination;

    use super::*;
    use crate::test_support::{FakePage, FakeView};

    const URL: &str = "https://m.place.naver.com/restaurant/1/review/visitor";
    const MORE: &str = "a.more";

    fn driver() -> PaginationDriver {
        PaginationDriver::new(Duration::from_secs(10), Duration::from_secs(2))
    }

    async fn page_with(view: FakeView) -> FakePage {
        let page = FakePage::new().with_view(URL, view);
        page.navigate(URL).await.expect("navigate");
        page
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_cap_even_when_more_remains() {
        let page = page_with(FakeView::new().reveal_control(MORE, 10)).await;

        let report = driver().expand(&page, MORE, Some(3)).await;

        assert_eq!(report.iterations_performed, 3);
        assert_eq!(report.terminated_by, Termination::Capped);
        assert_eq!(page.clicks(MORE), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_runs_until_control_disappears() {
        let page = page_with(FakeView::new().reveal_control(MORE, 4)).await;

        let report = driver().expand(&page, MORE, None).await;

        assert_eq!(report.iterations_performed, 4);
        assert_eq!(report.terminated_by, Termination::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cap_means_unbounded() {
        let page = page_with(FakeView::new().reveal_control(MORE, 2)).await;

        let report = driver().expand(&page, MORE, Some(0)).await;

        assert_eq!(report, ExpansionReport::exhausted(2));
    }

    #[tokio::test(start_paused = true)]
    async fn absent_control_is_zero_iterations() {
        let page = page_with(FakeView::new()).await;

        let report = driver().expand(&page, MORE, Some(50)).await;

        assert_eq!(report, ExpansionReport::exhausted(0));
        assert_eq!(page.clicks(MORE), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cap_equal_to_available_batches_reports_capped() {
        let page = page_with(FakeView::new().reveal_control(MORE, 2)).await;

        let report = driver().expand(&page, MORE, Some(2)).await;

        assert_eq!(report, ExpansionReport::capped(2));
        assert!(report.is_truncated());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_control_ends_expansion_without_error() {
        let page = page_with(FakeView::new().failing_node(MORE)).await;

        let report = driver().expand(&page, MORE, None).await;

        assert_eq!(report, ExpansionReport::exhausted(0));
    }

    #[tokio::test(start_paused = true)]
    async fn settles_after_every_click() {
        let page = page_with(FakeView::new().reveal_control(MORE, 3)).await;
        let started = tokio::time::Instant::now();

        driver().expand(&page, MORE, None).await;

        assert!(started.elapsed() >= Duration::from_secs(6));
    }
}
