use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{AnalysisSource, CoarseGrade, CrimeAnalysisResult};

const GEOCODER_USER_AGENT: &str = "LoanEligibilityAPI/1.0";

/// Reference point for the synthetic score heuristic (lower Manhattan).
const REFERENCE_LATITUDE: f64 = 40.7128;
const REFERENCE_LONGITUDE: f64 = -74.0060;
const BASE_SCORE: f64 = 50.0;

/// Best-effort coordinates for a free-text address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Address-to-coordinates lookup against a public geocoding service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError>;
}

/// Nominatim-style geocoder. Takes the first result, if any.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(GEOCODER_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let rows: Vec<NominatimRow> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let (Ok(latitude), Ok(longitude)) = (row.lat.parse::<f64>(), row.lon.parse::<f64>())
        else {
            warn!(lat = %row.lat, lon = %row.lon, "geocoder returned non-numeric coordinates");
            return Ok(None);
        };

        let address_fields = row.address.unwrap_or_default();
        Ok(Some(GeocodedAddress {
            latitude,
            longitude,
            formatted_address: row.display_name,
            city: address_fields.city.or(address_fields.town),
            state: address_fields.state,
            postal_code: address_fields.postcode,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct NominatimRow {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddressFields>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddressFields {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
}

/// Synthetic score from coordinate distance to the reference point.
///
/// Placeholder heuristic, not a crime model: score grows with distance, is
/// clamped to 0..=100, and maps onto the coarse grade thresholds.
pub fn score_from_coordinates(latitude: f64, longitude: f64) -> CrimeAnalysisResult {
    let lat_variation = (latitude - REFERENCE_LATITUDE).abs() * 10.0;
    let lon_variation = (longitude - REFERENCE_LONGITUDE).abs() * 10.0;
    let score = (BASE_SCORE + lat_variation + lon_variation)
        .clamp(0.0, 100.0)
        .round() as u32;

    CrimeAnalysisResult {
        crime_grade: grade_for_score(score),
        crime_score: score,
        confidence: 0.6,
        source: AnalysisSource::CoordinatesAnalysis,
        details: Some(json!({ "latitude": latitude, "longitude": longitude })),
        error: None,
    }
}

fn grade_for_score(score: u32) -> CoarseGrade {
    if score >= 90 {
        CoarseGrade::A
    } else if score >= 80 {
        CoarseGrade::B
    } else if score >= 70 {
        CoarseGrade::C
    } else if score >= 60 {
        CoarseGrade::D
    } else {
        CoarseGrade::F
    }
}
