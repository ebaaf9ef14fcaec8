use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use super::domain::{AnalysisSource, CoarseGrade, CrimeAnalysisResult, CrimeGradeResult};
use super::geocode::{score_from_coordinates, Geocoder};
use super::scraper::{GradeScraper, PageBrowser};
use super::{CrimeGrader, GraderError};

/// Tiered crime analysis: scraper first, geocode heuristic second, terminal
/// default last. Always produces a result; no tier failure reaches the caller.
pub struct CrimeAnalysisResolver<B, G> {
    scraper: GradeScraper<B>,
    geocoder: G,
}

impl<B: PageBrowser, G: Geocoder> CrimeAnalysisResolver<B, G> {
    pub fn new(browser: B, geocoder: G, crimegrade_base_url: impl Into<String>) -> Self {
        Self {
            scraper: GradeScraper::new(browser, crimegrade_base_url),
            geocoder,
        }
    }

    pub async fn analyze_crime_for_address(&self, address: &str) -> CrimeAnalysisResult {
        if let Some(result) = self.scraper.scrape_grade(address).await {
            if result.error.is_none() {
                return result;
            }
        }

        warn!(%address, "crime site unavailable, falling back to geocoding");

        match self.geocoder.lookup(address).await {
            Ok(Some(location)) => score_from_coordinates(location.latitude, location.longitude),
            Ok(None) => terminal_default(),
            Err(err) => {
                // Transport failures count as "no geocode result": logged,
                // never surfaced, the chain ends in the terminal default.
                error!(%address, %err, "geocoding failed");
                terminal_default()
            }
        }
    }
}

fn terminal_default() -> CrimeAnalysisResult {
    CrimeAnalysisResult {
        crime_grade: CoarseGrade::F,
        crime_score: 0,
        confidence: 0.0,
        source: AnalysisSource::Fallback,
        details: None,
        error: Some("Unable to determine crime grade for address".to_string()),
    }
}

/// Adapter exposing the resolver through the [`CrimeGrader`] seam used by the
/// eligibility engine.
pub struct ResolverGrader<B, G> {
    resolver: Arc<CrimeAnalysisResolver<B, G>>,
}

impl<B, G> ResolverGrader<B, G> {
    pub fn new(resolver: Arc<CrimeAnalysisResolver<B, G>>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<B: PageBrowser, G: Geocoder> CrimeGrader for ResolverGrader<B, G> {
    async fn grade_address(&self, address: &str) -> Result<CrimeGradeResult, GraderError> {
        let analysis = self.resolver.analyze_crime_for_address(address).await;
        Ok(analysis.into_grade_result(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::crime::geocode::{GeocodeError, GeocodedAddress};
    use crate::workflows::crime::scraper::BrowserError;

    struct ScriptedBrowser(Result<&'static str, ()>);

    #[async_trait]
    impl PageBrowser for ScriptedBrowser {
        async fn render(&self, _url: &str) -> Result<String, BrowserError> {
            match self.0 {
                Ok(html) => Ok(html.to_string()),
                Err(()) => Err(BrowserError::Session("navigation timeout".to_string())),
            }
        }
    }

    enum ScriptedGeocoder {
        Found(f64, f64),
        Empty,
        Broken,
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn lookup(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
            match self {
                ScriptedGeocoder::Found(lat, lon) => Ok(Some(GeocodedAddress {
                    latitude: *lat,
                    longitude: *lon,
                    formatted_address: address.to_string(),
                    city: None,
                    state: None,
                    postal_code: None,
                })),
                ScriptedGeocoder::Empty => Ok(None),
                ScriptedGeocoder::Broken => {
                    // Exercise the transport-failure arm without a live socket.
                    let err = reqwest::Client::builder()
                        .https_only(true)
                        .build()
                        .expect("client builds")
                        .get("http://127.0.0.1:1")
                        .send()
                        .await
                        .expect_err("https-only client rejects http");
                    Err(GeocodeError::Http(err))
                }
            }
        }
    }

    const BASE_URL: &str = "https://www.crimegrade.org";

    #[tokio::test]
    async fn scraper_success_short_circuits() {
        let resolver = CrimeAnalysisResolver::new(
            ScriptedBrowser(Ok(r#"<div class="grade-pill">B</div>"#)),
            ScriptedGeocoder::Found(40.0, -74.0),
            BASE_URL,
        );

        let result = resolver.analyze_crime_for_address("123 Main St 10001").await;
        assert_eq!(result.source, AnalysisSource::CrimeGradeOrg);
        assert_eq!(result.crime_grade, CoarseGrade::B);
    }

    #[tokio::test]
    async fn failed_scrape_falls_back_to_coordinates() {
        let resolver = CrimeAnalysisResolver::new(
            ScriptedBrowser(Err(())),
            ScriptedGeocoder::Found(44.7128, -74.0060),
            BASE_URL,
        );

        let result = resolver.analyze_crime_for_address("123 Main St 10001").await;
        assert_eq!(result.source, AnalysisSource::CoordinatesAnalysis);
        assert_eq!(result.crime_score, 90);
        assert_eq!(result.crime_grade, CoarseGrade::A);
    }

    #[tokio::test]
    async fn exhausted_tiers_return_terminal_default() {
        let resolver = CrimeAnalysisResolver::new(
            ScriptedBrowser(Err(())),
            ScriptedGeocoder::Empty,
            BASE_URL,
        );

        let result = resolver.analyze_crime_for_address("nowhere in particular").await;
        assert_eq!(result.source, AnalysisSource::Fallback);
        assert_eq!(result.crime_grade, CoarseGrade::F);
        assert_eq!(result.crime_score, 0);
        assert_eq!(
            result.error.as_deref(),
            Some("Unable to determine crime grade for address")
        );
    }

    #[tokio::test]
    async fn geocoder_transport_failure_degrades_to_terminal_default() {
        let resolver = CrimeAnalysisResolver::new(
            ScriptedBrowser(Err(())),
            ScriptedGeocoder::Broken,
            BASE_URL,
        );

        let result = resolver.analyze_crime_for_address("123 Main St 10001").await;
        assert_eq!(result.source, AnalysisSource::Fallback);
        assert_eq!(result.crime_grade, CoarseGrade::F);
        assert_eq!(result.crime_score, 0);
        assert_eq!(
            result.error.as_deref(),
            Some("Unable to determine crime grade for address")
        );
    }

    #[tokio::test]
    async fn resolver_grader_lifts_analysis_into_grade_result() {
        let resolver = Arc::new(CrimeAnalysisResolver::new(
            ScriptedBrowser(Ok(r#"<div class="grade-pill">A</div>"#)),
            ScriptedGeocoder::Empty,
            BASE_URL,
        ));

        let grader = ResolverGrader::new(resolver);
        let result = grader
            .grade_address("350 5th Ave, New York, NY 10001")
            .await
            .expect("resolver grader never fails");
        assert_eq!(result.overall_grade, crate::workflows::crime::LetterGrade::A);
        assert_eq!(result.zip.as_deref(), Some("10001"));
    }
}
