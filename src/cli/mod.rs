pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "channel-scraper")]
#[command(about = "Extract video metadata from a channel's video listing", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: ~/.config/channel-scraper/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print single-line JSON instead of pretty-printed JSON
    #[arg(long, global = true)]
    pub compact: bool,

    /// Write the JSON result to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a channel's video listing with a headless browser
    Scrape {
        /// Channel videos URL (default: channel_url from the config)
        url: Option<String>,

        /// Maximum scroll steps before extraction
        #[arg(long)]
        max_scroll_steps: Option<u32>,

        /// Settle delay after each scroll step, in milliseconds
        #[arg(long)]
        step_delay_ms: Option<u64>,

        /// Navigation timeout in milliseconds
        #[arg(long)]
        navigation_timeout_ms: Option<u64>,

        /// Budget for the whole scrape, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },
    /// Run extraction over a saved HTML page (no browser)
    Extract {
        /// Saved HTML document
        path: PathBuf,

        /// URL the page was saved from, used to resolve relative links
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Show the config file location
    Config {
        /// Print the default configuration instead
        #[arg(long)]
        print_default: bool,
    },
}
