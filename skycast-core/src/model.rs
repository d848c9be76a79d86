use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MisalignedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A place name as typed, plus its coordinates once geocoding succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    /// Location-local time of the observation.
    pub observed_at: NaiveDateTime,
}

/// Hourly observations as parallel sequences of equal length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HourlySeries {
    time: Vec<NaiveDateTime>,
    temperature_c: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
    wind_speed_kmh: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn new(
        time: Vec<NaiveDateTime>,
        temperature_c: Vec<Option<f64>>,
        weather_code: Vec<Option<i32>>,
        wind_speed_kmh: Vec<Option<f64>>,
    ) -> Result<Self, MisalignedSeries> {
        let expected = time.len();
        check_len("hourly", "temperature_2m", expected, temperature_c.len())?;
        check_len("hourly", "weathercode", expected, weather_code.len())?;
        check_len("hourly", "windspeed_10m", expected, wind_speed_kmh.len())?;

        Ok(Self {
            time,
            temperature_c,
            weather_code,
            wind_speed_kmh,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn temperature_c(&self) -> &[Option<f64>] {
        &self.temperature_c
    }

    pub fn weather_code(&self) -> &[Option<i32>] {
        &self.weather_code
    }

    pub fn wind_speed_kmh(&self) -> &[Option<f64>] {
        &self.wind_speed_kmh
    }
}

/// Daily aggregates as parallel sequences of equal length.
///
/// Sunrise and sunset are carried alongside but may be absent, shorter or
/// hold nulls; they only feed the day/night flag.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DailySeries {
    date: Vec<NaiveDate>,
    max_temp_c: Vec<Option<f64>>,
    min_temp_c: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
    max_wind_kmh: Vec<Option<f64>>,
    sunrise: Vec<Option<NaiveDateTime>>,
    sunset: Vec<Option<NaiveDateTime>>,
}

impl DailySeries {
    pub fn new(
        date: Vec<NaiveDate>,
        max_temp_c: Vec<Option<f64>>,
        min_temp_c: Vec<Option<f64>>,
        weather_code: Vec<Option<i32>>,
        max_wind_kmh: Vec<Option<f64>>,
    ) -> Result<Self, MisalignedSeries> {
        let expected = date.len();
        check_len("daily", "temperature_2m_max", expected, max_temp_c.len())?;
        check_len("daily", "temperature_2m_min", expected, min_temp_c.len())?;
        check_len("daily", "weathercode", expected, weather_code.len())?;
        check_len("daily", "windspeed_10m_max", expected, max_wind_kmh.len())?;

        Ok(Self {
            date,
            max_temp_c,
            min_temp_c,
            weather_code,
            max_wind_kmh,
            sunrise: Vec::new(),
            sunset: Vec::new(),
        })
    }

    pub fn with_sun_times(
        mut self,
        sunrise: Vec<Option<NaiveDateTime>>,
        sunset: Vec<Option<NaiveDateTime>>,
    ) -> Self {
        self.sunrise = sunrise;
        self.sunset = sunset;
        self
    }

    pub fn len(&self) -> usize {
        self.date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    pub fn date(&self) -> &[NaiveDate] {
        &self.date
    }

    pub fn max_temp_c(&self) -> &[Option<f64>] {
        &self.max_temp_c
    }

    pub fn min_temp_c(&self) -> &[Option<f64>] {
        &self.min_temp_c
    }

    pub fn weather_code(&self) -> &[Option<i32>] {
        &self.weather_code
    }

    pub fn max_wind_kmh(&self) -> &[Option<f64>] {
        &self.max_wind_kmh
    }

    pub fn first_sunrise(&self) -> Option<NaiveDateTime> {
        self.sunrise.first().copied().flatten()
    }

    pub fn first_sunset(&self) -> Option<NaiveDateTime> {
        self.sunset.first().copied().flatten()
    }
}

/// Everything one forecast call returns, already validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPayload {
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}

impl ForecastPayload {
    /// Wall-clock time at the forecast location for the given instant.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        match FixedOffset::east_opt(self.utc_offset_seconds) {
            Some(offset) => now.with_timezone(&offset).naive_local(),
            None => now.naive_utc(),
        }
    }
}

fn check_len(
    series: &'static str,
    field: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), MisalignedSeries> {
    if expected == found {
        Ok(())
    } else {
        Err(MisalignedSeries {
            series,
            field,
            expected,
            found,
        })
    }
}
