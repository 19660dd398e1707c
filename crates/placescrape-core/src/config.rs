use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/98.0.4758.102 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let input_path = PathBuf::from(or_default("PLACESCRAPE_INPUT_PATH", "./store_list.csv"));
    let id_column = or_default("PLACESCRAPE_ID_COLUMN", "id");
    let output_dir = PathBuf::from(or_default("PLACESCRAPE_OUTPUT_DIR", "./scraping_data"));
    let base_url = or_default(
        "PLACESCRAPE_BASE_URL",
        "https://m.place.naver.com/restaurant",
    )
    .trim_end_matches('/')
    .to_string();
    let log_level = or_default("PLACESCRAPE_LOG_LEVEL", "info");

    let review_max_iterations = iteration_cap(parse_u32("PLACESCRAPE_MAX_ITERATIONS", "50")?);
    let menu_max_iterations = iteration_cap(parse_u32("PLACESCRAPE_MENU_MAX_ITERATIONS", "0")?);
    let wait_timeout_secs = parse_u64("PLACESCRAPE_WAIT_TIMEOUT_SECS", "10")?;
    let settle_delay_ms = parse_u64("PLACESCRAPE_SETTLE_DELAY_MS", "2000")?;

    let user_agent = or_default("PLACESCRAPE_USER_AGENT", DEFAULT_USER_AGENT);
    let headless = parse_bool("PLACESCRAPE_HEADLESS", &or_default("PLACESCRAPE_HEADLESS", "true"))?;
    let chrome_path = lookup("PLACESCRAPE_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        input_path,
        id_column,
        output_dir,
        base_url,
        log_level,
        review_max_iterations,
        menu_max_iterations,
        wait_timeout_secs,
        settle_delay_ms,
        user_agent,
        headless,
        chrome_path,
    })
}

/// Map a configured iteration count to a cap; `0` means unbounded.
#[must_use]
pub fn iteration_cap(raw: u32) -> Option<u32> {
    (raw > 0).then_some(raw)
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
