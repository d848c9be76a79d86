use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ResolveError,
    model::Coordinates,
    provider::{Geocoder, get_json},
};

const SERVICE: &str = "OpenCage";
const DEFAULT_BASE_URL: &str = "https://api.opencagedata.com";

/// Forward geocoding through the OpenCage API. Requires an API key.
#[derive(Debug, Clone)]
pub struct OpenCageGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenCageGeocoder {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OcGeometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OcResult {
    geometry: OcGeometry,
    formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    #[serde(default)]
    results: Vec<OcResult>,
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    async fn resolve(&self, name: &str) -> Result<Coordinates, ResolveError> {
        let url = format!("{}/geocode/v1/json", self.base_url);

        let parsed: OcResponse =
            get_json(&self.http, SERVICE, &url, &[("q", name), ("key", self.api_key.as_str())])
                .await?;

        let best = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))?;

        tracing::info!(
            query = name,
            matched = best.formatted.as_deref().unwrap_or(name),
            lat = best.geometry.lat,
            lng = best.geometry.lng,
            "Resolved location"
        );

        Ok(Coordinates::new(best.geometry.lat, best.geometry.lng))
    }
}
