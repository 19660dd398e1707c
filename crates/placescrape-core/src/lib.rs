//! Domain types, configuration, and input enumeration shared by the
//! scraper and the command line runner.

mod app_config;
mod config;
pub mod records;
pub mod stores;
pub mod tables;

use thiserror::Error;

pub use app_config::{AppConfig, BrowserOptions};
pub use config::{iteration_cap, load_app_config, load_app_config_from_env};
pub use records::{
    ExpansionReport, MenuRecord, ProfileRecord, ReviewRecord, RevisitValue, StoreOutputUnit,
    Termination,
};
pub use stores::{load_store_targets, StoreTarget};
pub use tables::{Cell, Table};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("store list not found at {path}")]
    InputMissing { path: String },

    #[error("failed to read store list {path}: {source}")]
    InputIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store list {path} has no \"{column}\" column")]
    MissingColumn { column: String, path: String },
}
