pub mod chrome;
pub mod error;
pub mod extract;
pub mod page;
pub mod pagination;
pub mod parse;
pub mod rules;
pub mod selectors;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use chrome::ChromeSession;
pub use error::ScraperError;
pub use extract::RecordExtractor;
pub use page::PageSession;
pub use pagination::PaginationDriver;
pub use rules::{FieldRule, FieldValue, PostProcess, Record, Selector};
pub use store::{StoreScraper, StoreStage, StoreUrls};
