use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use tokio::time::sleep;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::assembler::{scrape_playlist, scrape_video};
use crate::browser::{PageDriver, SessionFactory};
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::record::{Target, VideoRecord};
use crate::sink::CsvSink;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub targets: usize,
    pub rows_written: usize,
    /// Rows with every field extracted.
    pub complete: usize,
    pub output: PathBuf,
}

impl BatchSummary {
    pub fn partial(&self) -> usize {
        self.rows_written - self.complete
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ [{}] Saved {} rows ({} complete, {} partial) from {} target(s) to '{}' in {:.1}s",
            self.run_id,
            self.rows_written,
            self.complete,
            self.partial(),
            self.targets,
            self.output.display(),
            (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0,
        )
    }
}

/// Scrapes each target in order over one session. Delays between targets, never before the first.
pub async fn collect_videos<D: PageDriver + ?Sized>(
    driver: &D,
    targets: &[Target],
    config: &ScraperConfig,
) -> Vec<VideoRecord> {
    let mut records = Vec::with_capacity(targets.len());
    for (index, target) in targets.iter().enumerate() {
        if index > 0 {
            sleep(config.target_delay).await;
        }
        info!(progress = %format!("{}/{}", index + 1, targets.len()), url = %target.url, "next target");
        records.push(scrape_video(driver, &target.url, config).await);
    }
    records
}

/// Runs a batch of watch pages and writes one row per target to `sink`.
///
/// Launch and sink failures are returned; per-target failures only degrade that target's row.
pub async fn run_batch<F: SessionFactory>(
    factory: &F,
    targets: &[Target],
    sink: &CsvSink,
    config: &ScraperConfig,
) -> Result<BatchSummary, ScrapeError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    async {
        info!(targets = targets.len(), "🚀 starting batch");
        let session = factory.acquire()?;
        let records = collect_videos(&session, targets, config).await;
        drop(session);

        let rows_written = sink.write(&records)?;
        Ok::<_, ScrapeError>(BatchSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            targets: targets.len(),
            rows_written,
            complete: records.iter().filter(|r| r.is_complete()).count(),
            output: sink.path().to_path_buf(),
        })
    }
    .instrument(info_span!("batch", %run_id))
    .await
}

/// A batch of one.
pub async fn run_single<F: SessionFactory>(
    factory: &F,
    url: &str,
    sink: &CsvSink,
    config: &ScraperConfig,
) -> Result<BatchSummary, ScrapeError> {
    run_batch(factory, &[Target::video(url)], sink, config).await
}

/// Scrapes a playlist and writes one row per collected entry.
pub async fn run_playlist<F: SessionFactory>(
    factory: &F,
    target: &Target,
    sink: &CsvSink,
    config: &ScraperConfig,
) -> Result<BatchSummary, ScrapeError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    async {
        let session = factory.acquire()?;
        let records = scrape_playlist(&session, target, config).await;
        drop(session);

        let rows_written = sink.write(&records)?;
        Ok::<_, ScrapeError>(BatchSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            targets: 1,
            rows_written,
            complete: records
                .iter()
                .filter(|r| [&r.title, &r.channel, &r.view, &r.url].iter().all(|v| v.is_present()))
                .count(),
            output: sink.path().to_path_buf(),
        })
    }
    .instrument(info_span!("playlist", %run_id))
    .await
}
