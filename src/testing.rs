//! In-memory stand-ins for Chrome used by the unit tests.

use scraper::{Html, Selector};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::browser::{scripts, PageDriver, SessionFactory};
use crate::config::{PaginationConfig, ScraperConfig};
use crate::error::ScrapeError;

/// One page the fake browser can load.
#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    markup: String,
    /// Markup once the comment section has been scrolled into view; `None` means it never loads.
    comments_markup: Option<String>,
    heights: VecDeque<i64>,
    grows_forever: bool,
    content_fails: bool,
}

impl FakeDocument {
    pub fn new(markup: impl Into<String>) -> Self {
        Self { markup: markup.into(), ..Default::default() }
    }

    pub fn comments(mut self, markup: impl Into<String>) -> Self {
        self.comments_markup = Some(markup.into());
        self
    }

    /// Successive `scrollHeight` readings; the last one repeats.
    pub fn heights(mut self, heights: &[i64]) -> Self {
        self.heights = heights.iter().copied().collect();
        self
    }

    pub fn growing_forever(mut self) -> Self {
        self.grows_forever = true;
        self
    }

    pub fn failing_content(mut self) -> Self {
        self.content_fails = true;
        self
    }
}

#[derive(Debug, Default)]
struct Loaded {
    doc: FakeDocument,
    comments_loaded: bool,
    grown: i64,
}

/// A `PageDriver` over canned documents keyed by URL.
pub struct FakePage {
    pages: HashMap<String, FakeDocument>,
    loaded: RefCell<Option<Loaded>>,
    visited: RefCell<Vec<String>>,
    scrolls: Cell<usize>,
    releases: Rc<Cell<usize>>,
}

impl FakePage {
    pub fn new(pages: HashMap<String, FakeDocument>, releases: Rc<Cell<usize>>) -> Self {
        Self {
            pages,
            loaded: RefCell::new(None),
            visited: RefCell::new(Vec::new()),
            scrolls: Cell::new(0),
            releases,
        }
    }

    pub fn single(url: &str, doc: FakeDocument) -> Self {
        Self::new(HashMap::from([(url.to_string(), doc)]), Rc::new(Cell::new(0)))
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.get()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }

    fn current_markup(&self) -> Result<String, ScrapeError> {
        let loaded = self.loaded.borrow();
        let loaded = loaded.as_ref().ok_or_else(|| ScrapeError::Content("no page loaded".into()))?;
        if loaded.doc.content_fails {
            return Err(ScrapeError::Content("renderer crashed".into()));
        }
        Ok(match (&loaded.doc.comments_markup, loaded.comments_loaded) {
            (Some(markup), true) => markup.clone(),
            _ => loaded.doc.markup.clone(),
        })
    }

    fn next_height(&self) -> Result<i64, ScrapeError> {
        let mut loaded = self.loaded.borrow_mut();
        let loaded = loaded.as_mut().ok_or_else(|| ScrapeError::Script("no page loaded".into()))?;
        if loaded.doc.grows_forever {
            loaded.grown += 500;
            return Ok(loaded.grown);
        }
        match loaded.doc.heights.len() {
            0 => Err(ScrapeError::Script("scrollHeight unavailable".into())),
            1 => Ok(loaded.doc.heights[0]),
            _ => Ok(loaded.doc.heights.pop_front().unwrap_or_default()),
        }
    }
}

impl PageDriver for FakePage {
    fn navigate(&self, url: &str) -> Result<(), ScrapeError> {
        self.visited.borrow_mut().push(url.to_string());
        let doc = self.pages.get(url).cloned().ok_or_else(|| ScrapeError::Navigation {
            url: url.to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".into(),
        })?;
        *self.loaded.borrow_mut() = Some(Loaded { doc, ..Default::default() });
        Ok(())
    }

    fn evaluate(&self, script: &str) -> Result<Value, ScrapeError> {
        match script {
            scripts::SCROLL_TO_BOTTOM => {
                self.scrolls.set(self.scrolls.get() + 1);
                Ok(Value::Null)
            }
            scripts::DOCUMENT_HEIGHT => self.next_height().map(Value::from),
            scripts::SCROLL_TO_COMMENTS => {
                if let Some(loaded) = self.loaded.borrow_mut().as_mut() {
                    loaded.comments_loaded = true;
                }
                Ok(Value::Bool(true))
            }
            other => Err(ScrapeError::Script(format!("unexpected script: {other}"))),
        }
    }

    fn content(&self) -> Result<String, ScrapeError> {
        self.current_markup()
    }

    fn has_element(&self, selector: &str) -> Result<bool, ScrapeError> {
        let markup = self.current_markup()?;
        let selector = Selector::parse(selector)
            .map_err(|_| ScrapeError::Script(format!("bad selector {selector}")))?;
        Ok(Html::parse_document(&markup).select(&selector).next().is_some())
    }
}

impl Drop for FakePage {
    fn drop(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// Hands out `FakePage`s and counts acquisitions and releases.
pub struct FakeLauncher {
    pub pages: HashMap<String, FakeDocument>,
    pub acquired: Cell<usize>,
    pub releases: Rc<Cell<usize>>,
    pub fail: bool,
}

impl FakeLauncher {
    pub fn new(pages: impl IntoIterator<Item = (&'static str, FakeDocument)>) -> Self {
        Self {
            pages: pages.into_iter().map(|(url, doc)| (url.to_string(), doc)).collect(),
            acquired: Cell::new(0),
            releases: Rc::new(Cell::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(Vec::<(&'static str, FakeDocument)>::new()) }
    }

    pub fn released(&self) -> usize {
        self.releases.get()
    }
}

impl SessionFactory for FakeLauncher {
    type Session = FakePage;

    fn acquire(&self) -> Result<FakePage, ScrapeError> {
        if self.fail {
            return Err(ScrapeError::Launch("chrome binary not found".into()));
        }
        self.acquired.set(self.acquired.get() + 1);
        Ok(FakePage::new(self.pages.clone(), self.releases.clone()))
    }
}

/// Production defaults with every delay removed and short waits.
pub fn fast_config() -> ScraperConfig {
    ScraperConfig {
        page_timeout: Duration::from_millis(50),
        comments_timeout: Duration::from_millis(30),
        poll_interval: Duration::from_millis(5),
        load_delay: Duration::ZERO,
        comments_scroll_delay: Duration::ZERO,
        pagination: PaginationConfig { settle_delay: Duration::ZERO, max_rounds: 30 },
        target_delay: Duration::ZERO,
        ..ScraperConfig::default()
    }
}

// ============================================================================
// Markup fixtures
// ============================================================================

pub struct WatchPage<'a> {
    pub title: Option<&'a str>,
    pub channel: Option<&'a str>,
    pub views: &'a str,
    pub likes: &'a str,
    pub published: &'a str,
}

impl Default for WatchPage<'_> {
    fn default() -> Self {
        Self {
            title: Some("Hãy Trao Cho Anh"),
            channel: Some("Sơn Tùng M-TP Official"),
            views: "1.234.567 lượt xem",
            likes: "12K",
            published: "12 thg 5, 2021",
        }
    }
}

impl WatchPage<'_> {
    pub fn markup(&self) -> String {
        self.render("")
    }

    pub fn markup_with_comments(&self, count: &str) -> String {
        self.render(&format!(
            r#"<ytd-comments id="comments"><ytd-comments-header-renderer>
                 <h2 id="count"><yt-formatted-string><span>{count}</span> bình luận</yt-formatted-string></h2>
               </ytd-comments-header-renderer></ytd-comments>"#
        ))
    }

    fn render(&self, comments: &str) -> String {
        let title = self
            .title
            .map(|t| format!(r#"<h1 class="title ytd-video-primary-info-renderer"><yt-formatted-string>{t}</yt-formatted-string></h1>"#))
            .unwrap_or_default();
        let channel = self
            .channel
            .map(|c| format!(r#"<ytd-channel-name><a href="/@channel">{c}</a></ytd-channel-name>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body><ytd-watch-flexy>
                 {title}
                 <ytd-video-view-count-renderer><span class="view-count">{views}</span></ytd-video-view-count-renderer>
                 <div id="info-strings"><yt-formatted-string>{published}</yt-formatted-string></div>
                 <like-button-view-model><div class="yt-spec-button-shape-next__button-text-content">{likes}</div></like-button-view-model>
                 <ytd-video-owner-renderer>{channel}</ytd-video-owner-renderer>
                 {comments}
               </ytd-watch-flexy></body></html>"#,
            views = self.views,
            published = self.published,
            likes = self.likes,
        )
    }
}

/// A playlist page with `entries` renderers; entry 0 has no link.
pub fn playlist_markup(entries: usize) -> String {
    let items: String = (0..entries)
        .map(|i| {
            let href = if i == 0 { String::new() } else { format!(r#" href="/watch?v=vid{i}&amp;list=PL1""#) };
            format!(
                r#"<ytd-playlist-video-renderer>
                     <a id="video-title"{href} title="Video {i}">Video {i}</a>
                     <div id="byline-container">
                       <ytd-channel-name><a href="/@c{i}">Kênh {i}</a></ytd-channel-name>
                       <div id="video-info"><span>{i},5 N lượt xem</span><span>•</span></div>
                     </div>
                   </ytd-playlist-video-renderer>"#
            )
        })
        .collect();
    format!("<html><body><ytd-playlist-video-list-renderer>{items}</ytd-playlist-video-list-renderer></body></html>")
}
