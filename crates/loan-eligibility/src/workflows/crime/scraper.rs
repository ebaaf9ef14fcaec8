use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::json;
use tracing::warn;
use url::Url;

use super::domain::{AnalysisSource, CoarseGrade, CrimeAnalysisResult};

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const SETTLE_DELAY: Duration = Duration::from_secs(3);
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Failure while driving a browser session.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("browser session failed: {0}")]
    Session(String),
    #[error("navigation failed: {0}")]
    Navigation(#[from] reqwest::Error),
}

/// Renders a page for inspection. One session per call; implementations must
/// release the session on every exit path, including errors.
#[async_trait]
pub trait PageBrowser: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, BrowserError>;
}

/// HTTP-backed page renderer.
///
/// A fresh client is built per navigation so each scrape attempt is an
/// isolated session; dropping the client releases it on every exit path.
#[derive(Debug, Default, Clone)]
pub struct HttpPageBrowser;

#[async_trait]
impl PageBrowser for HttpPageBrowser {
    async fn render(&self, url: &str) -> Result<String, BrowserError> {
        let session = reqwest::Client::builder()
            .timeout(NAVIGATION_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|err| BrowserError::Session(err.to_string()))?;

        let response = session.get(url).send().await?;
        // Fixed settle delay so late-rendered content has a chance to appear.
        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(response.text().await?)
    }
}

/// Best-effort scraper over a public crime-rating site.
pub struct GradeScraper<B> {
    browser: B,
    base_url: String,
}

impl<B: PageBrowser> GradeScraper<B> {
    pub fn new(browser: B, base_url: impl Into<String>) -> Self {
        Self {
            browser,
            base_url: base_url.into(),
        }
    }

    /// `None` signals "try the next fallback tier", never a fatal error.
    pub async fn scrape_grade(&self, address: &str) -> Option<CrimeAnalysisResult> {
        let url = match search_url(&self.base_url, address) {
            Ok(url) => url,
            Err(err) => {
                warn!(base_url = %self.base_url, %err, "invalid crime site search url");
                return None;
            }
        };

        let html = match self.browser.render(url.as_str()).await {
            Ok(html) => html,
            Err(err) => {
                warn!(%url, %err, "crime site scrape failed");
                return None;
            }
        };

        Some(extract_from_page(&html))
    }
}

fn search_url(base_url: &str, address: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.set_path("/search");
    url.query_pairs_mut().append_pair("q", address);
    Ok(url)
}

/// Inspect the rendered page for elements whose class names suggest a grade,
/// score, or rating. Inherently brittle; grade defaults to F and score to 0.
fn extract_from_page(html: &str) -> CrimeAnalysisResult {
    let document = Html::parse_document(html);
    let grade_selector = Selector::parse(r#"[class*="grade"], [class*="score"], [class*="rating"]"#)
        .expect("static selector parses");
    let score_selector = Selector::parse(r#"[class*="score"]"#).expect("static selector parses");
    let stats_selector =
        Selector::parse(r#"[class*="crime"], [class*="stat"]"#).expect("static selector parses");

    let grade_text = document
        .select(&grade_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string());
    let score_text = document
        .select(&score_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string());
    let stats_text = document
        .select(&stats_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string());

    let grade = grade_text
        .as_deref()
        .and_then(|text| text.chars().find_map(CoarseGrade::from_char));
    let confidence = if grade.is_some() { 0.8 } else { 0.5 };

    let score = score_text
        .as_deref()
        .and_then(first_digit_run)
        .unwrap_or(0);

    CrimeAnalysisResult {
        crime_grade: grade.unwrap_or(CoarseGrade::F),
        crime_score: score,
        confidence,
        source: AnalysisSource::CrimeGradeOrg,
        details: Some(json!({
            "grade_element": grade_text,
            "score_element": score_text,
            "crime_stats": stats_text,
        })),
        error: None,
    }
}

fn first_digit_run(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
