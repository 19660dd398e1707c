use thiserror::Error;

use crate::store::StoreStage;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element is no longer attached to the page: {0}")]
    StaleElement(String),

    #[error("{stage} failed for store {store_id}: {source}")]
    Stage {
        store_id: String,
        stage: StoreStage,
        #[source]
        source: Box<ScraperError>,
    },
}
