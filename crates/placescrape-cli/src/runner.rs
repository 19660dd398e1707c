//! Sequential multi-store runner.
//!
//! Each store is scraped and handed to the sink before the next one starts.
//! A failure in either step is logged and counted against that store only.

use std::path::PathBuf;
use std::process::ExitCode;

use placescrape_core::StoreTarget;
use placescrape_scraper::{PageSession, StoreScraper};

use crate::sink::OutputSink;

/// Outcome of processing a single store.
pub(crate) enum StoreOutcome {
    Written(PathBuf),
    Failed(anyhow::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub(crate) fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// `0` when every store succeeded (or there were none), `2` when some
    /// failed, `1` when all of them did.
    pub(crate) fn exit_status(&self) -> u8 {
        if self.failed == 0 {
            0
        } else if self.succeeded == 0 {
            1
        } else {
            2
        }
    }

    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

pub(crate) async fn process_store<P, S>(
    page: &P,
    scraper: &StoreScraper,
    sink: &S,
    target: &StoreTarget,
) -> StoreOutcome
where
    P: PageSession,
    S: OutputSink,
{
    let unit = match scraper.scrape(page, target).await {
        Ok(unit) => unit,
        Err(e) => return StoreOutcome::Failed(e.into()),
    };
    match sink.write_unit(&unit) {
        Ok(path) => StoreOutcome::Written(path),
        Err(e) => StoreOutcome::Failed(e.into()),
    }
}

/// Process every target in order. Never aborts early.
pub(crate) async fn run_stores<P, S>(
    page: &P,
    scraper: &StoreScraper,
    sink: &S,
    targets: &[StoreTarget],
) -> RunSummary
where
    P: PageSession,
    S: OutputSink,
{
    let mut summary = RunSummary::default();
    let store_count = targets.len();

    for (index, target) in targets.iter().enumerate() {
        tracing::info!(
            store_id = %target,
            position = index + 1,
            total = store_count,
            "processing store"
        );
        match process_store(page, scraper, sink, target).await {
            StoreOutcome::Written(path) => {
                tracing::info!(store_id = %target, path = %path.display(), "store saved");
                summary.succeeded += 1;
            }
            StoreOutcome::Failed(e) => {
                tracing::error!(store_id = %target, error = %format!("{e:#}"), "store failed; continuing");
                summary.failed += 1;
            }
        }
    }

    if summary.failed > 0 {
        tracing::warn!(
            failed_stores = summary.failed,
            total_stores = store_count,
            "some stores failed during the run"
        );
    }
    summary
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
