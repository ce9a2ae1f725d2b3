use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
    #[error("no geocoding results")]
    NoResults,
    #[error("GEOAPIFY_API_KEY is not set")]
    MissingApiKey,
}

pub const DEFAULT_CATEGORIES: &str = "tourism.sights,tourism.attraction";
pub const DEFAULT_RADIUS_M: u32 = 6000;
pub const DEFAULT_LIMIT: u32 = 12;
pub const MAX_LIMIT: u32 = 50;

/// A geocoded city center. Cached per normalized city/country key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedCity {
    pub lat: f64,
    pub lon: f64,
    pub formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    lat: f64,
    lon: f64,
    formatted: Option<String>,
}

// Geoapify places responses are GeoJSON; only the feature properties
// carry what we render.
#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    #[serde(default)]
    properties: PlaceProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceProperties {
    pub name: Option<String>,
    pub formatted: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub formatted: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub distance: Option<f64>,
}

pub struct GeoapifyClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeoapifyClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("FlugbasarServer/1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Resolves a city name to coordinates. An empty result set is a
    /// `NoResults` failure so callers can answer 404 instead of 502.
    pub async fn geocode(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<GeocodedCity, PlacesError> {
        let api_key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;
        let url = format!("{}/v1/geocode/search", self.base_url);
        let text = match country {
            Some(country) => format!("{}, {}", city, country),
            None => city.to_string(),
        };

        let response = self
            .client
            .get(&url)
            .query(&[
                ("text", text.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("lang", "de"),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Status(status));
        }

        let body: GeocodeResponse = response.json().await?;
        let result = body.results.into_iter().next().ok_or(PlacesError::NoResults)?;
        Ok(GeocodedCity {
            lat: result.lat,
            lon: result.lon,
            formatted: result.formatted,
        })
    }

    /// Points of interest around a center.
    pub async fn search(
        &self,
        lat: f64,
        lon: f64,
        categories: &str,
        radius_m: u32,
        limit: u32,
    ) -> Result<Vec<Place>, PlacesError> {
        let api_key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;
        let url = format!("{}/v2/places", self.base_url);

        // The circle filter wants lon,lat order.
        let response = self
            .client
            .get(&url)
            .query(&[
                ("categories", categories),
                ("filter", &format!("circle:{},{},{}", lon, lat, radius_m)),
                ("bias", &format!("proximity:{},{}", lon, lat)),
                ("limit", &limit.to_string()),
                ("lang", "de"),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Status(status));
        }

        let body: PlacesResponse = response.json().await?;
        Ok(simplify_places(
            body.features.into_iter().map(|f| f.properties).collect(),
        ))
    }
}

pub fn simplify_places(properties: Vec<PlaceProperties>) -> Vec<Place> {
    properties
        .into_iter()
        .map(|p| Place {
            name: p.name.unwrap_or_else(|| "Ohne Name".to_string()),
            formatted: p.formatted.unwrap_or_default(),
            lat: p.lat,
            lon: p.lon,
            distance: p.distance,
        })
        .collect()
}
