use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ScraperConfig;

/// Scrape video and playlist metadata into CSV
#[derive(Parser, Debug)]
#[command(name = "yt-meta-scraper")]
#[command(about = "Scrape video and playlist metadata into CSV", long_about = None)]
pub struct Cli {
    /// Append diagnostics to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Chrome/Chromium binary to launch
    #[arg(long, global = true)]
    pub chrome_path: Option<PathBuf>,

    /// Browser UI locale, e.g. vi-VN
    #[arg(long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape a single watch page
    Video {
        #[arg(value_parser = address)]
        url: String,
        #[arg(short, long, default_value = "data.csv")]
        output: PathBuf,
    },
    /// Scrape several watch pages over one browser session
    Batch {
        /// Watch page addresses, scraped in the order given
        #[arg(value_parser = address)]
        urls: Vec<String>,
        /// File with one address per line (`#` starts a comment)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long, default_value = "data.csv")]
        output: PathBuf,
    },
    /// Scrape the entries of a playlist
    Playlist {
        #[arg(value_parser = address)]
        url: String,
        /// Keep at most this many entries
        #[arg(short = 'n', long)]
        num_of_video: Option<usize>,
        /// Upper bound on scroll rounds
        #[arg(long)]
        max_rounds: Option<usize>,
        #[arg(short, long, default_value = "data.csv")]
        output: PathBuf,
    },
}

fn address(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err("address must not be blank".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

impl Cli {
    /// Command-line flags take precedence over environment and defaults.
    pub fn apply(&self, config: &mut ScraperConfig) {
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        if let Some(path) = &self.chrome_path {
            config.browser.chrome_path = Some(path.clone());
        }
        if let Some(locale) = &self.locale {
            config.browser.locale = locale.clone();
        }
        if let Commands::Playlist { max_rounds: Some(rounds), .. } = &self.command {
            config.pagination.max_rounds = *rounds;
        }
    }
}
