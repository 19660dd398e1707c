//! The per-store pipeline: four page loads, two expansions, and the
//! extraction that turns them into one [`StoreOutputUnit`].

use std::fmt;
use std::future::Future;

use chrono::Utc;
use placescrape_core::{
    iteration_cap, AppConfig, ExpansionReport, MenuRecord, ProfileRecord, ReviewRecord,
    StoreOutputUnit, StoreTarget,
};

use crate::error::ScraperError;
use crate::extract::{to_menu_record, to_review_record, RecordExtractor};
use crate::page::PageSession;
use crate::pagination::PaginationDriver;
use crate::selectors::{
    AMENITY_RULE, HOME_RULES, INFORMATION_RULES, MENU_CONTAINER, MENU_RULES, REVEAL_MORE,
    REVIEW_CONTAINER, REVIEW_RULES,
};

/// The four views of one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUrls {
    pub home: String,
    pub information: String,
    pub menu: String,
    pub review: String,
}

impl StoreUrls {
    #[must_use]
    pub fn new(base_url: &str, store_id: &str) -> Self {
        let root = format!("{}/{store_id}", base_url.trim_end_matches('/'));
        Self {
            home: format!("{root}/home"),
            information: format!("{root}/information"),
            menu: format!("{root}/menu/list"),
            review: format!("{root}/review/visitor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStage {
    LoadProfileHome,
    LoadProfileInfo,
    LoadMenu,
    ExpandMenu,
    ExtractMenu,
    LoadReview,
    ExpandReview,
    ExtractReview,
    Assemble,
}

impl StoreStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadProfileHome => "load_profile_home",
            Self::LoadProfileInfo => "load_profile_info",
            Self::LoadMenu => "load_menu",
            Self::ExpandMenu => "expand_menu",
            Self::ExtractMenu => "extract_menu",
            Self::LoadReview => "load_review",
            Self::ExpandReview => "expand_review",
            Self::ExtractReview => "extract_review",
            Self::Assemble => "assemble",
        }
    }
}

impl fmt::Display for StoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StoreScraper {
    base_url: String,
    driver: PaginationDriver,
    extractor: RecordExtractor,
    menu_max_iterations: Option<u32>,
    review_max_iterations: Option<u32>,
}

impl StoreScraper {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        driver: PaginationDriver,
        extractor: RecordExtractor,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            driver,
            extractor,
            menu_max_iterations: None,
            review_max_iterations: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            PaginationDriver::new(config.wait_timeout(), config.settle_delay()),
            RecordExtractor::new(config.wait_timeout()),
        )
        .with_menu_max_iterations(config.menu_max_iterations)
        .with_review_max_iterations(config.review_max_iterations)
    }

    /// `Some(0)` is normalised to `None` (unbounded).
    #[must_use]
    pub fn with_menu_max_iterations(mut self, cap: Option<u32>) -> Self {
        self.menu_max_iterations = cap.and_then(iteration_cap);
        self
    }

    /// `Some(0)` is normalised to `None` (unbounded).
    #[must_use]
    pub fn with_review_max_iterations(mut self, cap: Option<u32>) -> Self {
        self.review_max_iterations = cap.and_then(iteration_cap);
        self
    }

    #[must_use]
    pub fn urls(&self, target: &StoreTarget) -> StoreUrls {
        StoreUrls::new(&self.base_url, &target.id)
    }

    /// Scrape every view of `target` and assemble the output unit.
    ///
    /// Missing fields, missing items, and a reveal control that never shows
    /// up are all normal outcomes. Only a session failure (navigation,
    /// browser protocol) fails the store.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Stage`] naming the stage that failed.
    pub async fn scrape<P: PageSession>(
        &self,
        page: &P,
        target: &StoreTarget,
    ) -> Result<StoreOutputUnit, ScraperError> {
        let store_id = target.id.as_str();
        let urls = self.urls(target);

        let mut profile = ProfileRecord::new();
        stage(store_id, StoreStage::LoadProfileHome, page.navigate(&urls.home)).await?;
        let home = self.extractor.extract_singleton(page, HOME_RULES).await;
        profile.extend(home.into_fields().map(|(field, value)| (field, value.into_text())));

        stage(store_id, StoreStage::LoadProfileInfo, page.navigate(&urls.information)).await?;
        let information = self.extractor.extract_singleton(page, INFORMATION_RULES).await;
        profile.extend(information.into_fields().map(|(field, value)| (field, value.into_text())));
        let amenities = self.extractor.extract_label_list(page, &AMENITY_RULE).await;
        profile.set(AMENITY_RULE.field, amenities);

        stage(store_id, StoreStage::LoadMenu, page.navigate(&urls.menu)).await?;
        let menu_expansion = self
            .expand(page, store_id, StoreStage::ExpandMenu, self.menu_max_iterations)
            .await;
        let menu: Vec<MenuRecord> = stage(
            store_id,
            StoreStage::ExtractMenu,
            self.extractor.extract_list(page, MENU_CONTAINER, MENU_RULES),
        )
        .await?
        .iter()
        .map(to_menu_record)
        .collect();

        stage(store_id, StoreStage::LoadReview, page.navigate(&urls.review)).await?;
        let review_expansion = self
            .expand(page, store_id, StoreStage::ExpandReview, self.review_max_iterations)
            .await;
        let reviews: Vec<ReviewRecord> = stage(
            store_id,
            StoreStage::ExtractReview,
            self.extractor.extract_list(page, REVIEW_CONTAINER, REVIEW_RULES),
        )
        .await?
        .iter()
        .map(to_review_record)
        .collect();

        tracing::info!(
            store_id,
            stage = %StoreStage::Assemble,
            store_name = profile.name(),
            menu_items = menu.len(),
            reviews = reviews.len(),
            "store scraped"
        );

        Ok(StoreOutputUnit {
            store_id: store_id.to_owned(),
            captured_at: Utc::now(),
            profile,
            menu,
            reviews,
            menu_expansion,
            review_expansion,
        })
    }

    async fn expand<P: PageSession>(
        &self,
        page: &P,
        store_id: &str,
        stage: StoreStage,
        cap: Option<u32>,
    ) -> ExpansionReport {
        let report = self.driver.expand(page, REVEAL_MORE, cap).await;
        if report.is_truncated() {
            tracing::warn!(
                store_id,
                stage = %stage,
                iterations = report.iterations_performed,
                "list expansion hit the iteration cap; results may be incomplete"
            );
        } else {
            tracing::debug!(
                store_id,
                stage = %stage,
                iterations = report.iterations_performed,
                "list fully expanded"
            );
        }
        report
    }
}

async fn stage<T>(
    store_id: &str,
    stage: StoreStage,
    fut: impl Future<Output = Result<T, ScraperError>>,
) -> Result<T, ScraperError> {
    tracing::debug!(store_id, stage = %stage, "entering stage");
    fut.await.map_err(|source| ScraperError::Stage {
        store_id: store_id.to_owned(),
        stage,
        source: Box::new(source),
    })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
