use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use channel_scraper::cli::commands::{self, ScrapeOverrides};
use channel_scraper::cli::{Cli, Commands};
use channel_scraper::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for the JSON result
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let outcome = match cli.command {
        Commands::Scrape {
            url,
            max_scroll_steps,
            step_delay_ms,
            navigation_timeout_ms,
            timeout_secs,
            headful,
        } => {
            let mut scraper_config = config.scraper;
            if headful {
                scraper_config.headless = false;
            }
            let overrides = ScrapeOverrides {
                max_scroll_steps,
                step_delay_ms,
                navigation_timeout_ms,
                timeout_secs,
            };
            commands::scrape(scraper_config, url.as_deref(), &overrides).await?
        }
        Commands::Extract { path, base_url } => {
            commands::extract(&config.scraper, &path, base_url.as_deref())?
        }
        Commands::Config { print_default } => {
            commands::show_config(print_default)?;
            return Ok(());
        }
    };

    commands::write_outcome(&outcome, cli.output.as_deref(), cli.compact)?;

    if outcome.is_failure() {
        std::process::exit(1);
    }
    Ok(())
}
