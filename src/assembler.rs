use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use crate::browser::{scripts, PageDriver};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::extract::{clean_count_value, extract, extract_field, resolve, FieldSpec};
use crate::pagination::scroll_until_stable;
use crate::record::{FieldValue, PlaylistRecord, Target, VideoRecord};
use crate::wait::wait_for_selector;

// ============================================================================
// Selectors
// ============================================================================

/// Present once the watch page's primary content has rendered.
pub const PRIMARY_MARKER: &str = "ytd-watch-flexy";
/// Present once the lazily loaded comment header has rendered.
pub const COMMENTS_MARKER: &str = "ytd-comments-header-renderer #count";
pub const PLAYLIST_ENTRY: &str = "ytd-playlist-video-renderer";

static PLAYLIST_ENTRY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(PLAYLIST_ENTRY).unwrap());

mod video_fields {
    use super::FieldSpec;

    pub const TITLE: FieldSpec = FieldSpec::text(
        "title",
        &["ytd-watch-metadata h1 yt-formatted-string, h1.ytd-video-primary-info-renderer yt-formatted-string"],
    );
    pub const CHANNEL: FieldSpec = FieldSpec::text("channel", &["ytd-channel-name a"]);
    pub const VIEW: FieldSpec = FieldSpec::text("view", &["ytd-video-view-count-renderer", "span"]);
    pub const LIKES: FieldSpec = FieldSpec::text(
        "likes",
        &["like-button-view-model", ".yt-spec-button-shape-next__button-text-content"],
    );
    pub const PUBLISH_DATE: FieldSpec =
        FieldSpec::text("publish_date", &["#info-strings yt-formatted-string"]);
    pub const COMMENTS: FieldSpec =
        FieldSpec::text("comments", &[super::COMMENTS_MARKER, "yt-formatted-string"]);
}

mod playlist_fields {
    use super::FieldSpec;

    pub const TITLE: FieldSpec = FieldSpec::attr("title", &["a#video-title"], "title");
    pub const LINK: FieldSpec = FieldSpec::attr("url", &["a#video-title"], "href");
    pub const CHANNEL: FieldSpec =
        FieldSpec::text("channel", &["#byline-container", "ytd-channel-name a"]);
    pub const VIEW: FieldSpec = FieldSpec::text("view", &["#byline-container", "#video-info span"]);
}

// ============================================================================
// Playlist
// ============================================================================

/// Resolves a playlist entry's href against `host`.
fn absolute_link(host: &str, href: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(host).map_err(|e| ScrapeError::Content(format!("bad host {host}: {e}")))?;
    base.join(href)
        .map(String::from)
        .map_err(|e| ScrapeError::Content(format!("bad link {href}: {e}")))
}

/// Builds one record per playlist entry in `markup`, keeping at most `cap`.
/// A cap of zero means no cap.
pub fn assemble_playlist(markup: &str, cap: Option<usize>, host: &str) -> Vec<PlaylistRecord> {
    let document = Html::parse_document(markup);

    let entries = document.select(&PLAYLIST_ENTRY_SELECTOR);
    let entries: Vec<_> = match cap.filter(|&cap| cap > 0) {
        Some(cap) => entries.take(cap).collect(),
        None => entries.collect(),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let url = match extract(entry, &playlist_fields::LINK) {
                Ok(href) => match absolute_link(host, &href) {
                    Ok(link) => FieldValue::from_text(link),
                    Err(e) => {
                        debug!(index, error = %e, "entry link defaulted");
                        FieldValue::Missing
                    }
                },
                Err(e) => resolve(playlist_fields::LINK.name, Err(e)),
            };

            PlaylistRecord {
                title: extract_field(entry, &playlist_fields::TITLE),
                channel: extract_field(entry, &playlist_fields::CHANNEL),
                view: clean_count_value(extract_field(entry, &playlist_fields::VIEW)),
                url,
            }
        })
        .collect()
}

/// Loads a playlist, scrolls until every entry has rendered and assembles its records.
///
/// A playlist that cannot be loaded yields no records.
pub async fn scrape_playlist<D: PageDriver + ?Sized>(
    driver: &D,
    target: &Target,
    config: &ScraperConfig,
) -> Vec<PlaylistRecord> {
    info!(url = %target.url, cap = ?target.cap, "📜 scraping playlist");
    if let Err(e) = driver.navigate(&target.url) {
        warn!(url = %target.url, error = %e, "playlist navigation failed");
        return Vec::new();
    }
    sleep(config.load_delay).await;

    let scroll = scroll_until_stable(driver, &config.pagination).await;
    debug!(rounds = scroll.rounds, "playlist pagination finished");

    let markup = match driver.content() {
        Ok(markup) => markup,
        Err(e) => {
            warn!(url = %target.url, error = %e, "could not read playlist markup");
            return Vec::new();
        }
    };

    let records = assemble_playlist(&markup, target.cap, &config.host);
    info!(url = %target.url, entries = records.len(), "playlist assembled");
    records
}

// ============================================================================
// Single video
// ============================================================================

/// Reads every field available once the primary content has rendered.
/// `comments` is left missing; it loads separately.
pub fn read_primary_fields(markup: &str, url: &str) -> VideoRecord {
    let document = Html::parse_document(markup);
    let root = document.root_element();
    VideoRecord {
        title: extract_field(root, &video_fields::TITLE),
        channel: extract_field(root, &video_fields::CHANNEL),
        view: clean_count_value(extract_field(root, &video_fields::VIEW)),
        likes: clean_count_value(extract_field(root, &video_fields::LIKES)),
        comments: FieldValue::Missing,
        publish_date: extract_field(root, &video_fields::PUBLISH_DATE),
        url: url.to_string(),
    }
}

pub fn read_comment_count(markup: &str) -> FieldValue {
    let document = Html::parse_document(markup);
    clean_count_value(extract_field(document.root_element(), &video_fields::COMMENTS))
}

/// Second phase: bring the comment widget into view and wait for its counter.
async fn load_comment_count<D: PageDriver + ?Sized>(
    driver: &D,
    url: &str,
    config: &ScraperConfig,
) -> FieldValue {
    if let Err(e) = driver.evaluate(scripts::SCROLL_TO_COMMENTS) {
        warn!(url, error = %e, "could not scroll to comments");
    }
    sleep(config.comments_scroll_delay).await;

    if let Err(e) =
        wait_for_selector(driver, COMMENTS_MARKER, config.comments_timeout, config.poll_interval).await
    {
        warn!(url, error = %e, "comment count never appeared");
        return FieldValue::Missing;
    }

    match driver.content() {
        Ok(markup) => read_comment_count(&markup),
        Err(e) => {
            warn!(url, error = %e, "could not read markup after comments loaded");
            FieldValue::Missing
        }
    }
}

async fn try_scrape_video<D: PageDriver + ?Sized>(
    driver: &D,
    url: &str,
    config: &ScraperConfig,
) -> Result<VideoRecord, ScrapeError> {
    driver.navigate(url)?;
    let waited =
        wait_for_selector(driver, PRIMARY_MARKER, config.page_timeout, config.poll_interval).await?;
    debug!(url, ?waited, "primary content ready");

    let markup = driver.content()?;
    let mut record = read_primary_fields(&markup, url);
    record.comments = load_comment_count(driver, url, config).await;
    Ok(record)
}

/// Scrapes one watch page. Never fails: anything that goes wrong yields sentinel fields.
pub async fn scrape_video<D: PageDriver + ?Sized>(
    driver: &D,
    url: &str,
    config: &ScraperConfig,
) -> VideoRecord {
    info!(url, "🎬 scraping video");
    match try_scrape_video(driver, url, config).await {
        Ok(record) => {
            let missing = record.missing_fields();
            if !missing.is_empty() {
                info!(url, ?missing, "video scraped with missing fields");
            }
            record
        }
        Err(e) => {
            warn!(url, error = %e, "video could not be scraped, emitting N/A record");
            VideoRecord::unavailable(url)
        }
    }
}
