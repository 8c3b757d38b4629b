use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScrapeError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";
pub const DEFAULT_LOCALE: &str = "vi-VN";
pub const DEFAULT_HOST: &str = "https://www.youtube.com";
pub const DEFAULT_MAX_SCROLL_ROUNDS: usize = 30;

/// Launch parameters for the headless browser.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Chrome binary; `None` lets headless_chrome locate one.
    pub chrome_path: Option<PathBuf>,
    pub locale: String,
    pub user_agent: String,
    pub window_size: (u32, u32),
    /// How long Chrome may sit without CDP traffic before headless_chrome gives up on it.
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            locale: DEFAULT_LOCALE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            window_size: (1920, 1080),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub settle_delay: Duration,
    pub max_rounds: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(3),
            max_rounds: DEFAULT_MAX_SCROLL_ROUNDS,
        }
    }
}

/// Everything a run needs besides its targets.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub browser: BrowserConfig,
    /// Prefix for relative playlist links.
    pub host: String,
    /// Bound on waiting for the watch page's primary content.
    pub page_timeout: Duration,
    /// Bound on waiting for the lazily loaded comment header.
    pub comments_timeout: Duration,
    pub poll_interval: Duration,
    /// Pause after navigating to a playlist before the first height reading.
    pub load_delay: Duration,
    /// Pause after scrolling the comments section into view.
    pub comments_scroll_delay: Duration,
    pub pagination: PaginationConfig,
    /// Politeness delay between consecutive batch targets.
    pub target_delay: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            host: DEFAULT_HOST.to_string(),
            page_timeout: Duration::from_secs(10),
            comments_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            load_delay: Duration::from_secs(3),
            comments_scroll_delay: Duration::from_secs(1),
            pagination: PaginationConfig::default(),
            target_delay: Duration::from_secs(2),
            log_file: None,
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by process environment (call `dotenv()` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ScrapeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScrapeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("CHROME_PATH") {
            config.browser.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(locale) = lookup("SCRAPER_LOCALE") {
            config.browser.locale = locale;
        }
        if let Some(ua) = lookup("SCRAPER_USER_AGENT") {
            config.browser.user_agent = ua;
        }
        if let Some(host) = lookup("SCRAPER_HOST") {
            config.host = host.trim_end_matches('/').to_string();
        }
        if let Some(path) = lookup("SCRAPER_LOG_FILE") {
            config.log_file = Some(PathBuf::from(path));
        }

        if let Some(secs) = parse_key::<u64, _>(&lookup, "SCRAPER_PAGE_TIMEOUT_SECS")? {
            config.page_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "SCRAPER_COMMENTS_TIMEOUT_SECS")? {
            config.comments_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "SCRAPER_LOAD_DELAY_SECS")? {
            config.load_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "SCRAPER_SCROLL_DELAY_SECS")? {
            config.pagination.settle_delay = Duration::from_secs(secs);
        }
        if let Some(rounds) = parse_key::<usize, _>(&lookup, "SCRAPER_MAX_SCROLL_ROUNDS")? {
            config.pagination.max_rounds = rounds;
        }
        if let Some(secs) = parse_key::<u64, _>(&lookup, "SCRAPER_TARGET_DELAY_SECS")? {
            config.target_delay = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_key<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ScrapeError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ScrapeError::Config { key, value: raw }),
    }
}
