use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{ResolveError, TransportError},
    model::{Coordinates, CurrentConditions, DailySeries, ForecastPayload, HourlySeries},
    provider::{ForecastFetcher, Geocoder, get_json},
};

const FORECAST_SERVICE: &str = "Open-Meteo forecast";
const GEOCODING_SERVICE: &str = "Open-Meteo geocoding";

const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";
const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

const HOURLY_VARIABLES: &str = "temperature_2m,weathercode,windspeed_10m";
const DAILY_VARIABLES: &str =
    "temperature_2m_max,temperature_2m_min,weathercode,windspeed_10m_max,sunrise,sunset";

#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    base_url: String,
    http: Client,
}

impl Default for OpenMeteoForecast {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoForecast {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_FORECAST_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

/// Key-less forward geocoding through the Open-Meteo search API.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl Default for OpenMeteoGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoGeocoder {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_GEOCODING_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResult {
    name: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Absent entirely when nothing matched.
    #[serde(default)]
    results: Vec<OmSearchResult>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    time: String,
    temperature: f64,
    windspeed: f64,
    weathercode: f64,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    weathercode: Vec<Option<f64>>,
    windspeed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    weathercode: Vec<Option<f64>>,
    windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    timezone: String,
    #[serde(default)]
    utc_offset_seconds: i32,
    current_weather: OmCurrentWeather,
    hourly: OmHourly,
    daily: OmDaily,
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn resolve(&self, name: &str) -> Result<Coordinates, ResolveError> {
        let url = format!("{}/v1/search", self.base_url);

        let parsed: OmSearchResponse = get_json(
            &self.http,
            GEOCODING_SERVICE,
            &url,
            &[("name", name), ("count", "1"), ("format", "json")],
        )
        .await?;

        let best = parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))?;

        tracing::info!(
            query = name,
            matched = best.name.as_deref().unwrap_or(name),
            lat = best.latitude,
            lng = best.longitude,
            "Resolved location"
        );

        Ok(Coordinates::new(best.latitude, best.longitude))
    }
}

#[async_trait]
impl ForecastFetcher for OpenMeteoForecast {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastPayload, TransportError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();

        let parsed: OmForecastResponse = get_json(
            &self.http,
            FORECAST_SERVICE,
            &url,
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", HOURLY_VARIABLES),
                ("daily", DAILY_VARIABLES),
                ("current_weather", "true"),
                ("timezone", "auto"),
            ],
        )
        .await?;

        let payload = into_payload(parsed)?;
        tracing::debug!(
            timezone = %payload.timezone,
            hours = payload.hourly.len(),
            days = payload.daily.len(),
            "Fetched forecast"
        );

        Ok(payload)
    }
}

fn into_payload(raw: OmForecastResponse) -> Result<ForecastPayload, TransportError> {
    let current = CurrentConditions {
        temperature_c: raw.current_weather.temperature,
        wind_speed_kmh: raw.current_weather.windspeed,
        weather_code: to_code(raw.current_weather.weathercode),
        observed_at: parse_local_time(&raw.current_weather.time)?,
    };

    let hourly = HourlySeries::new(
        parse_all(&raw.hourly.time, parse_local_time)?,
        raw.hourly.temperature_2m,
        raw.hourly.weathercode.into_iter().map(|c| c.map(to_code)).collect(),
        raw.hourly.windspeed_10m,
    )
    .map_err(misaligned)?;

    let daily = DailySeries::new(
        parse_all(&raw.daily.time, parse_date)?,
        raw.daily.temperature_2m_max,
        raw.daily.temperature_2m_min,
        raw.daily.weathercode.into_iter().map(|c| c.map(to_code)).collect(),
        raw.daily.windspeed_10m_max,
    )
    .map_err(misaligned)?
    .with_sun_times(
        parse_nullable(&raw.daily.sunrise)?,
        parse_nullable(&raw.daily.sunset)?,
    );

    Ok(ForecastPayload {
        timezone: raw.timezone,
        utc_offset_seconds: raw.utc_offset_seconds,
        current,
        hourly,
        daily,
    })
}

// Older API revisions send weather codes as floats ("3.0").
fn to_code(raw: f64) -> i32 {
    raw.round() as i32
}

fn misaligned(err: crate::error::MisalignedSeries) -> TransportError {
    TransportError::Malformed {
        service: FORECAST_SERVICE,
        reason: err.to_string(),
    }
}

fn parse_all<T>(
    values: &[String],
    parse: fn(&str) -> Result<T, TransportError>,
) -> Result<Vec<T>, TransportError> {
    values.iter().map(|v| parse(v)).collect()
}

fn parse_nullable(
    values: &[Option<String>],
) -> Result<Vec<Option<NaiveDateTime>>, TransportError> {
    values.iter().map(|v| v.as_deref().map(parse_local_time).transpose()).collect()
}

/// Open-Meteo local timestamps come without seconds or offset, e.g. `2024-05-01T14:00`.
fn parse_local_time(value: &str) -> Result<NaiveDateTime, TransportError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| TransportError::Malformed {
            service: FORECAST_SERVICE,
            reason: format!("invalid timestamp '{value}'"),
        })
}

fn parse_date(value: &str) -> Result<NaiveDate, TransportError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| TransportError::Malformed {
        service: FORECAST_SERVICE,
        reason: format!("invalid date '{value}'"),
    })
}
