use crate::{
    Config,
    error::{ResolveError, TransportError},
    model::{Coordinates, ForecastPayload},
    provider::{opencage::OpenCageGeocoder, openmeteo::OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod opencage;
pub mod openmeteo;

/// Turns a free-text place name into coordinates.
///
/// Implementations take the first (highest ranked) candidate and ignore the rest.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn resolve(&self, name: &str) -> Result<Coordinates, ResolveError>;
}

/// Retrieves current, hourly and daily observations for a coordinate pair.
#[async_trait]
pub trait ForecastFetcher: Send + Sync + Debug {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastPayload, TransportError>;
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    async fn resolve(&self, name: &str) -> Result<Coordinates, ResolveError> {
        (**self).resolve(name).await
    }
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Box<T> {
    async fn resolve(&self, name: &str) -> Result<Coordinates, ResolveError> {
        (**self).resolve(name).await
    }
}

#[async_trait]
impl<T: ForecastFetcher + ?Sized> ForecastFetcher for Arc<T> {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastPayload, TransportError> {
        (**self).fetch(coordinates).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeocoderId {
    OpenCage,
    OpenMeteo,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::OpenCage => "opencage",
            GeocoderId::OpenMeteo => "open-meteo",
        }
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::OpenCage, GeocoderId::OpenMeteo]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, GeocoderId::OpenCage)
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "opencage" => Ok(GeocoderId::OpenCage),
            "open-meteo" | "openmeteo" => Ok(GeocoderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: opencage, open-meteo."
            )),
        }
    }
}

/// Construct a geocoder from config and explicit GeocoderId.
pub fn geocoder_from_config(id: GeocoderId, config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let boxed: Box<dyn Geocoder> = match id {
        GeocoderId::OpenCage => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for geocoder '{id}'.\n\
                     Hint: run `skycast configure {id}` and enter your API key."
                )
            })?;
            Box::new(OpenCageGeocoder::new(api_key.to_owned()))
        }
        GeocoderId::OpenMeteo => Box::new(OpenMeteoGeocoder::new()),
    };

    Ok(boxed)
}

/// Construct the default geocoder, falling back to the key-less Open-Meteo one.
pub fn default_geocoder_from_config(config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let id = config.default_geocoder_id()?.unwrap_or(GeocoderId::OpenMeteo);
    geocoder_from_config(id, config)
}

/// GET `url` with `query` and decode the JSON body, mapping every failure onto
/// [`TransportError`].
pub(crate) async fn get_json<T, Q>(
    http: &reqwest::Client,
    service: &'static str,
    url: &str,
    query: &Q,
) -> Result<T, TransportError>
where
    T: serde::de::DeserializeOwned,
    Q: serde::Serialize + ?Sized,
{
    tracing::debug!(service, url, "Sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| TransportError::Request { service, source })?;

    let status = res.status();
    let body = res.text().await.map_err(|source| TransportError::Request { service, source })?;

    if !status.is_success() {
        return Err(TransportError::Status {
            service,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| TransportError::Decode { service, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
