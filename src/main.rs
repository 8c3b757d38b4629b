mod assembler;
mod batch;
mod browser;
mod cli;
mod config;
mod error;
mod extract;
mod logging;
mod pagination;
mod record;
mod sink;
#[cfg(test)]
mod testing;
mod wait;

use anyhow::{bail, Context};
use clap::Parser;
use dotenv::dotenv;
use tracing::error;

use crate::batch::{run_batch, run_playlist, run_single};
use crate::browser::ChromeLauncher;
use crate::cli::{Cli, Commands};
use crate::config::ScraperConfig;
use crate::record::{parse_target_list, video_targets, Target};
use crate::sink::CsvSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut config = ScraperConfig::from_env()?;
    cli.apply(&mut config);
    logging::init(config.log_file.as_deref())?;

    let launcher = ChromeLauncher::new(config.browser.clone());

    let result = match cli.command {
        Commands::Video { url, output } => {
            run_single(&launcher, &url, &CsvSink::new(output), &config).await
        }
        Commands::Batch { urls, input, output } => {
            let mut targets = video_targets(urls.iter().map(String::as_str));
            if let Some(path) = input {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading address list {}", path.display()))?;
                targets.extend(parse_target_list(&text));
            }
            if targets.is_empty() {
                bail!("no addresses given; pass URLs or --input <file>");
            }
            run_batch(&launcher, &targets, &CsvSink::new(output), &config).await
        }
        Commands::Playlist { url, num_of_video, output, .. } => {
            let target = Target::playlist(url, num_of_video);
            let sink = CsvSink::new(output).with_bom(true);
            run_playlist(&launcher, &target, &sink, &config).await
        }
    };

    match result {
        Ok(summary) => {
            println!("{summary}");
            Ok(())
        }
        Err(e) => {
            if e.is_fatal() {
                error!(error = %e, "🔥 run aborted");
            }
            Err(e.into())
        }
    }
}
