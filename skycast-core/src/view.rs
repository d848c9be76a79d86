//! Pure derivation of render-ready structures from a forecast payload.
//!
//! Nothing here performs I/O; every function is deterministic in its inputs,
//! including the instant treated as "now".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;

use crate::{
    condition::WeatherCategory,
    model::{CurrentConditions, DailySeries, ForecastPayload, HourlySeries, Location},
};

pub const CHART_HOURS: usize = 24;
pub const SUMMARY_HOURS: usize = 24;
pub const SUMMARY_DAYS: usize = 3;

/// Temperature series laid out for a line chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub hour: u32,
    pub code: Option<i32>,
    pub wind_speed_kmh: Option<f64>,
    pub is_current_hour: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub code: Option<i32>,
    pub max_wind_kmh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureChart {
    pub series: ChartSeries,
    /// Label of the "current time" marker, in the same format as the series labels.
    pub marker: String,
}

/// Everything needed to draw one forecast screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub location: String,
    pub current: CurrentConditions,
    pub category: WeatherCategory,
    pub chart: TemperatureChart,
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
    pub is_day_time: bool,
}

pub fn hour_label(hour: u32) -> String {
    format!("{hour}:00")
}

pub fn build_chart_series(hourly: &HourlySeries) -> ChartSeries {
    let n = hourly.len().min(CHART_HOURS);

    ChartSeries {
        labels: hourly.time()[..n].iter().map(|t| hour_label(t.hour())).collect(),
        values: hourly.temperature_c()[..n].to_vec(),
    }
}

/// Hour-by-hour summary in source order.
///
/// An entry is the current hour when it falls in the same clock hour, on the
/// same date, as `observed_at`.
pub fn build_hourly_summary(
    hourly: &HourlySeries,
    observed_at: NaiveDateTime,
) -> Vec<HourlyEntry> {
    let current = truncate_to_hour(observed_at);

    hourly
        .time()
        .iter()
        .zip(hourly.weather_code())
        .zip(hourly.wind_speed_kmh())
        .take(SUMMARY_HOURS)
        .map(|((&time, &code), &wind_speed_kmh)| HourlyEntry {
            time,
            hour: time.hour(),
            code,
            wind_speed_kmh,
            is_current_hour: truncate_to_hour(time) == current,
        })
        .collect()
}

pub fn build_daily_summary(daily: &DailySeries) -> Vec<DailyEntry> {
    (0..daily.len().min(SUMMARY_DAYS))
        .map(|i| DailyEntry {
            date: daily.date()[i],
            max_temp_c: daily.max_temp_c()[i],
            min_temp_c: daily.min_temp_c()[i],
            code: daily.weather_code()[i],
            max_wind_kmh: daily.max_wind_kmh()[i],
        })
        .collect()
}

/// True iff `now` lies in `[sunrise, sunset)`. Unknown bounds count as night.
pub fn is_day_time(
    sunrise: Option<NaiveDateTime>,
    sunset: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> bool {
    match (sunrise, sunset) {
        (Some(sunrise), Some(sunset)) => sunrise <= now && now < sunset,
        _ => false,
    }
}

pub fn build_view(
    location: &Location,
    payload: &ForecastPayload,
    now: DateTime<Utc>,
) -> ForecastView {
    let local_now = payload.local_time(now);

    ForecastView {
        location: location.name.clone(),
        current: payload.current.clone(),
        category: WeatherCategory::from_code(payload.current.weather_code),
        chart: TemperatureChart {
            series: build_chart_series(&payload.hourly),
            marker: hour_label(local_now.hour()),
        },
        hourly: build_hourly_summary(&payload.hourly, payload.current.observed_at),
        daily: build_daily_summary(&payload.daily),
        is_day_time: is_day_time(
            payload.daily.first_sunrise(),
            payload.daily.first_sunset(),
            local_now,
        ),
    }
}

fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t)
}
