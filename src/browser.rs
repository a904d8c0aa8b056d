//! Browser session used to render the vendor's client-side prop pages.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ScrapeError;

/// A live rendering session. One session serves every fetch of a
/// [`Scraper`](crate::scraper::Scraper) and must be released with
/// [`Browser::quit`].
#[async_trait]
pub trait Browser: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// HTML of the currently rendered document
    async fn page_source(&mut self) -> Result<String, ScrapeError>;

    async fn quit(self) -> Result<(), ScrapeError>;
}

/// Chrome driven over WebDriver (chromedriver or a Selenium endpoint)
pub struct WebDriverSession {
    client: fantoccini::Client,
}

impl WebDriverSession {
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, ScrapeError> {
        let args: Vec<&str> = if headless {
            vec!["--headless", "--disable-gpu", "--no-sandbox"]
        } else {
            Vec::new()
        };

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = fantoccini::ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                ScrapeError::Browser(format!(
                    "Failed to open WebDriver session at {}: {}",
                    webdriver_url, e
                ))
            })?;

        info!("Opened browser session via {}", webdriver_url);
        Ok(Self { client })
    }
}

#[async_trait]
impl Browser for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Navigation to {} failed: {}", url, e)))
    }

    async fn page_source(&mut self) -> Result<String, ScrapeError> {
        self.client
            .source()
            .await
            .map_err(|e| ScrapeError::Browser(format!("Failed to read page source: {}", e)))
    }

    async fn quit(self) -> Result<(), ScrapeError> {
        match self.client.close().await {
            Ok(()) => {
                info!("Closed browser session");
                Ok(())
            }
            Err(e) => {
                warn!("Browser session did not close cleanly: {}", e);
                Err(ScrapeError::Browser(e.to_string()))
            }
        }
    }
}
