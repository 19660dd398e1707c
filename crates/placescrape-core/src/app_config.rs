use std::path::PathBuf;
use std::time::Duration;

/// Options used when launching the shared browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: String,
    pub chrome_path: Option<PathBuf>,
    pub window_size: (u32, u32),
    pub wait_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub id_column: String,
    pub output_dir: PathBuf,
    pub base_url: String,
    pub log_level: String,
    /// Reveal-more cap for the review view. `None` means unbounded.
    pub review_max_iterations: Option<u32>,
    /// Reveal-more cap for the menu view. `None` means unbounded.
    pub menu_max_iterations: Option<u32>,
    pub wait_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub user_agent: String,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
}

impl AppConfig {
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: self.headless,
            user_agent: self.user_agent.clone(),
            chrome_path: self.chrome_path.clone(),
            window_size: (1920, 1080),
            wait_timeout: self.wait_timeout(),
        }
    }
}
