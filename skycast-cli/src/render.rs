//! Text rendering of the dashboard view.

use std::fmt::{self, Write};

use skycast_core::{
    DailyEntry, DashboardView, ForecastView, HourlyEntry, IconRenderer, Screen, WeatherCategory,
};

/// Entries visible at once in the hourly carousel.
const CAROUSEL_WINDOW: usize = 8;
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const DAILY_COLUMN: usize = 22;

pub fn render(view: &DashboardView, icons: &dyn IconRenderer) -> String {
    Dashboard { view, icons }.to_string()
}

struct Dashboard<'a> {
    view: &'a DashboardView,
    icons: &'a dyn IconRenderer,
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== skycast ==")?;

        if let Some(err) = &self.view.error {
            writeln!(f, "Error: {err}")?;
        }

        match &self.view.screen {
            Screen::Empty => writeln!(f, "No data available. Please enter a location and submit."),
            Screen::Loading => writeln!(f, "Loading..."),
            Screen::Ready(forecast) => render_forecast(f, forecast, self.icons),
        }
    }
}

fn render_forecast(
    out: &mut impl Write,
    view: &ForecastView,
    icons: &dyn IconRenderer,
) -> fmt::Result {
    writeln!(out, "\nCurrent Weather in {}", view.location)?;
    writeln!(out, "  {}", icons.render_icon(view.category))?;
    writeln!(out, "  Temperature: {}°C", view.current.temperature_c)?;
    writeln!(out, "  Wind Speed: {} km/h", view.current.wind_speed_kmh)?;

    let period = if view.is_day_time { "day" } else { "night" };
    writeln!(out, "\nTemperature in the Next 24 Hours ({period})")?;
    render_chart(out, view)?;

    writeln!(out, "\nWeather Conditions in the Next 24 Hours")?;
    render_carousel(out, &view.hourly, icons)?;

    writeln!(out, "\nNext 3 Days")?;
    render_daily(out, &view.daily, icons)
}

fn render_chart(out: &mut impl Write, view: &ForecastView) -> fmt::Result {
    let series = &view.chart.series;
    if series.values.is_empty() {
        return writeln!(out, "  (no hourly temperatures)");
    }

    let line = sparkline(&series.values);
    match temperature_range(&series.values) {
        Some((min, max)) => writeln!(out, "  {line}  {min}°C .. {max}°C")?,
        None => writeln!(out, "  {line}  (no temperatures)")?,
    }

    match series.labels.iter().position(|l| *l == view.chart.marker) {
        Some(pos) => {
            writeln!(out, "  {}^ Current Time ({})", " ".repeat(pos), view.chart.marker)?
        }
        None => writeln!(out, "  Current Time: {}", view.chart.marker)?,
    }

    writeln!(
        out,
        "  {} .. {}",
        series.labels.first().map(String::as_str).unwrap_or_default(),
        series.labels.last().map(String::as_str).unwrap_or_default()
    )
}

/// Lowest and highest known value; `None` when every value is missing.
fn temperature_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |range, &v| match range {
        Some((lo, hi)) => Some((v.min(lo), v.max(hi))),
        None => Some((v, v)),
    })
}

/// One bar per value, scaled between the series minimum and maximum. Gaps stay blank.
fn sparkline(values: &[Option<f64>]) -> String {
    let Some((min, max)) = temperature_range(values) else {
        return " ".repeat(values.len());
    };
    let span = (max - min).max(0.001);

    values
        .iter()
        .map(|v| match v {
            Some(v) => {
                let norm = ((v - min) / span).clamp(0.0, 1.0);
                BARS[(norm * (BARS.len() - 1) as f64).round() as usize]
            }
            None => ' ',
        })
        .collect()
}

/// Start of the visible window, centred on the current hour where possible.
fn carousel_start(hourly: &[HourlyEntry]) -> usize {
    let Some(current) = hourly.iter().position(|e| e.is_current_hour) else {
        return 0;
    };
    let latest_start = hourly.len().saturating_sub(CAROUSEL_WINDOW);
    current.saturating_sub(CAROUSEL_WINDOW / 2 - 1).min(latest_start)
}

fn render_carousel(
    out: &mut impl Write,
    hourly: &[HourlyEntry],
    icons: &dyn IconRenderer,
) -> fmt::Result {
    if hourly.is_empty() {
        return writeln!(out, "  Loading...");
    }

    let start = carousel_start(hourly);
    let end = (start + CAROUSEL_WINDOW).min(hourly.len());

    if start > 0 {
        writeln!(out, "  ‹ {start} earlier")?;
    }
    for entry in &hourly[start..end] {
        let icon = entry
            .code
            .map(|c| icons.render_icon(WeatherCategory::from_code(c)))
            .unwrap_or_else(|| "-".to_string());
        let wind = with_unit(entry.wind_speed_kmh, " km/h");
        let marker = if entry.is_current_hour { '>' } else { ' ' };
        let hour = format!("{}:00", entry.hour);

        writeln!(out, "  {marker} {hour:>5}  {icon}  Wind: {wind}")?;
    }
    if end < hourly.len() {
        writeln!(out, "  › {} later", hourly.len() - end)?;
    }
    Ok(())
}

fn render_daily(
    out: &mut impl Write,
    daily: &[DailyEntry],
    icons: &dyn IconRenderer,
) -> fmt::Result {
    if daily.is_empty() {
        return writeln!(out, "  (no daily forecast)");
    }

    daily_row(out, daily, |d| d.date.format("%a %-d %b").to_string())?;
    daily_row(out, daily, |d| match d.code {
        Some(code) => icons.render_icon(WeatherCategory::from_code(code)),
        None => "-".to_string(),
    })?;
    daily_row(out, daily, |d| format!("Max: {}", with_unit(d.max_temp_c, "°C")))?;
    daily_row(out, daily, |d| format!("Min: {}", with_unit(d.min_temp_c, "°C")))?;
    daily_row(out, daily, |d| format!("Wind: {}", with_unit(d.max_wind_kmh, " km/h")))
}

fn daily_row(
    out: &mut impl Write,
    daily: &[DailyEntry],
    cell: impl Fn(&DailyEntry) -> String,
) -> fmt::Result {
    let line: String = daily.iter().map(|d| pad(&cell(d), DAILY_COLUMN)).collect();
    writeln!(out, "  {}", line.trim_end())
}

/// `value` followed by `unit`, or `N/A` without a unit when missing.
fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "N/A".to_string(),
    }
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{cell}{}", " ".repeat(width.saturating_sub(len)))
}
