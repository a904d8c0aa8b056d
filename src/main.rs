//! NBA prop line scraper
//!
//! Builds today's slate from the roster fixtures and the NBA live scoreboard,
//! scrapes player prop lines from bettingpros through a WebDriver session and
//! post-processes matchup exports into possession-adjusted metrics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn};

use nba_props::browser::WebDriverSession;
use nba_props::league::League;
use nba_props::scraper::Scraper;
use nba_props::{merge, possessions, Config, Fetch};

#[derive(Parser)]
#[command(name = "nba-props", version, about = "NBA player prop line scraper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print today's games with both rosters
    Games,
    /// Scrape same-day points lines for every eligible player
    Today,
    /// Scrape historical lines for one player, printed as CSV
    Historical {
        player: String,
        /// Also merge the lines into the player's game log
        #[arg(long)]
        merge: bool,
    },
    /// Possession-adjust the offense/defense matchup exports
    Adjust,
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create HTTP client")
}

async fn open_scraper(config: &Config) -> Result<Scraper<WebDriverSession>> {
    let browser = WebDriverSession::connect(&config.webdriver_url, config.headless).await?;
    Ok(Scraper::new(browser, config.scrape.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Local runs may keep overrides in .env; real env vars take precedence
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nba_props=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Games => {
            let league = League::today(&config, &http_client()?).await?;
            for game in league.games() {
                println!("{}", game.matchup_label());
                println!("{}\n", game.render_rosters());
            }
        }

        Command::Today => {
            let league = League::today(&config, &http_client()?).await?;

            let mut scraper = open_scraper(&config).await?;
            let report = scraper.scrape_today(&league).await;
            scraper.close().await;

            for quote in &report.valid {
                println!("{},{},{}", quote.player, quote.stat, quote.line);
            }
            for rejected in &report.invalid {
                let shown = match &rejected.outcome {
                    Fetch::Found(text) => text.as_str(),
                    other => other.describe(),
                };
                warn!("Rejected {} {}: {}", rejected.player, rejected.stat, shown);
            }
        }

        Command::Historical { player, merge: merge_log } => {
            let mut scraper = open_scraper(&config).await?;
            let result = scraper.scrape_historical(&player).await;
            scraper.close().await;

            let props = result?;
            print!("{}", props.to_csv_string()?);

            if merge_log {
                let out = merge::merge_player_props(
                    &config.gamelog_dir,
                    &config.merged_dir,
                    &player,
                    &props,
                    &config.scrape.calendar,
                )?;
                info!("Merged lines into {}", out.display());
            }
        }

        Command::Adjust => {
            let summary = possessions::run_batch(&config.matchup_dir, &config.adjusted_dir);
            if summary.failed > 0 {
                warn!("{} matchup files could not be processed", summary.failed);
            }
        }
    }

    Ok(())
}
