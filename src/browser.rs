use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::error::ScrapeError;

/// Scripts sent to the page. Kept to scroll triggers and presence checks.
pub mod scripts {
    pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.documentElement.scrollHeight);";
    pub const DOCUMENT_HEIGHT: &str = "document.documentElement.scrollHeight";
    pub const SCROLL_TO_COMMENTS: &str = r#"
        (() => {
            const el = document.querySelector('ytd-comments#comments, ytd-comments');
            if (el) { el.scrollIntoView(); return true; }
            window.scrollBy(0, 600);
            return false;
        })()
    "#;
}

// ============================================================================
// Driver contract
// ============================================================================

/// The browser operations the pipeline relies on.
pub trait PageDriver {
    fn navigate(&self, url: &str) -> Result<(), ScrapeError>;

    /// Evaluates `script` and returns its scalar result (`Null` for `undefined`).
    fn evaluate(&self, script: &str) -> Result<Value, ScrapeError>;

    /// Current rendered markup.
    fn content(&self) -> Result<String, ScrapeError>;

    fn has_element(&self, selector: &str) -> Result<bool, ScrapeError> {
        let quoted = Value::String(selector.to_string());
        let script = format!("document.querySelector({quoted}) !== null");
        Ok(self.evaluate(&script)?.as_bool().unwrap_or(false))
    }
}

/// Produces one session per batch.
pub trait SessionFactory {
    type Session: PageDriver;

    fn acquire(&self) -> Result<Self::Session, ScrapeError>;
}

// ============================================================================
// Chrome session
// ============================================================================

/// A live headless Chrome with a single tab.
///
/// Dropping the session is the release: Chrome is shut down exactly once, on every exit path.
pub struct Session {
    tab: Arc<Tab>,
    // Dropping the Browser kills the Chrome process.
    _browser: Browser,
}

impl Session {
    pub fn launch(config: &BrowserConfig) -> Result<Self, ScrapeError> {
        let lang_arg = format!("--lang={}", config.locale);
        let ua_arg = format!("--user-agent={}", config.user_agent);
        let args = vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&lang_arg),
            OsStr::new(&ua_arg),
        ];

        info!(locale = %config.locale, "launching headless browser");
        let browser = Browser::new(LaunchOptions {
            headless: true,
            sandbox: false,
            window_size: Some(config.window_size),
            path: config.chrome_path.clone(),
            idle_browser_timeout: config.idle_timeout,
            args,
            ..Default::default()
        })
        .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let tab = browser.new_tab().map_err(|e| ScrapeError::Launch(e.to_string()))?;
        tab.set_user_agent(&config.user_agent, Some(config.locale.as_str()), None)
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        Ok(Self { tab, _browser: browser })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        info!("browser session released");
    }
}

impl PageDriver for Session {
    fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        debug!(url, "navigating");
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn evaluate(&self, script: &str) -> Result<Value, ScrapeError> {
        let object = self
            .tab
            .evaluate(script, false)
            .map_err(|e| ScrapeError::Script(e.to_string()))?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    fn content(&self) -> Result<String, ScrapeError> {
        self.tab.get_content().map_err(|e| ScrapeError::Content(e.to_string()))
    }
}

/// Launches a fresh Chrome per acquisition.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for ChromeLauncher {
    type Session = Session;

    fn acquire(&self) -> Result<Session, ScrapeError> {
        Session::launch(&self.config)
    }
}
