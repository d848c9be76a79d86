//! Dashboard pipeline tests against stub geocoders and fetchers.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use skycast_core::{
    Coordinates, CurrentConditions, Dashboard, DailySeries, ForecastFetcher, ForecastPayload,
    Geocoder, HourlySeries, ResolveError, Screen, SubmitOutcome, TransportError,
};

#[derive(Debug, Default)]
struct StubGeocoder {
    places: HashMap<String, (Coordinates, Duration)>,
    miss_delay: Duration,
}

impl StubGeocoder {
    fn with(mut self, name: &str, lat: f64, lng: f64, delay_ms: u64) -> Self {
        self.places.insert(
            name.to_string(),
            (Coordinates::new(lat, lng), Duration::from_millis(delay_ms)),
        );
        self
    }

    fn missing_after(mut self, delay_ms: u64) -> Self {
        self.miss_delay = Duration::from_millis(delay_ms);
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, name: &str) -> Result<Coordinates, ResolveError> {
        match self.places.get(name).copied() {
            Some((coords, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(coords)
            }
            None => {
                tokio::time::sleep(self.miss_delay).await;
                Err(ResolveError::NotFound(name.to_string()))
            }
        }
    }
}

/// Returns a payload whose current temperature equals the requested latitude.
#[derive(Debug, Default)]
struct StubFetcher {
    calls: AtomicUsize,
    fail: bool,
    no_hourly: bool,
}

#[async_trait]
impl ForecastFetcher for StubFetcher {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastPayload, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransportError::Malformed {
                service: "stub",
                reason: "boom".into(),
            });
        }
        let hours = if self.no_hourly { 0 } else { 30 };
        Ok(payload(coordinates.latitude, 14.5, 3, hours))
    }
}

fn at(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn payload(
    temperature_c: f64,
    wind_speed_kmh: f64,
    weather_code: i32,
    hours: i64,
) -> ForecastPayload {
    let hourly = HourlySeries::new(
        (0..hours).map(|i| at(0) + chrono::Duration::hours(i)).collect(),
        (0..hours).map(|i| Some(10.0 + i as f64)).collect(),
        (0..hours).map(|_| Some(1)).collect(),
        (0..hours).map(|_| Some(12.0)).collect(),
    )
    .unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let daily = DailySeries::new(
        (0..4).map(|i| day + chrono::Duration::days(i)).collect(),
        vec![Some(18.0); 4],
        vec![Some(8.0); 4],
        vec![Some(61); 4],
        vec![Some(25.0); 4],
    )
    .unwrap()
    .with_sun_times(vec![Some(at(6))], vec![Some(at(20))]);

    ForecastPayload {
        timezone: "GMT".into(),
        utc_offset_seconds: 0,
        current: CurrentConditions {
            temperature_c,
            wind_speed_kmh,
            weather_code,
            observed_at: at(14),
        },
        hourly,
        daily,
    }
}

fn noon() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn submit_london_populates_view_from_current_weather() {
    let dashboard = Dashboard::new(
        StubGeocoder::default().with("London", 51.5, -0.12, 0),
        StubFetcher::default(),
    );

    let outcome = dashboard.submit("London").await;
    assert_eq!(outcome, SubmitOutcome::Applied);

    let location = dashboard.location().unwrap();
    assert_eq!(location.name, "London");
    assert_eq!(location.coordinates, Some(Coordinates::new(51.5, -0.12)));

    let view = dashboard.view(noon());
    assert_eq!(view.error, None);
    let Screen::Ready(forecast) = view.screen else {
        panic!("expected a ready screen, got {:?}", view.screen);
    };
    assert_eq!(forecast.location, "London");
    assert_eq!(forecast.current.temperature_c, 51.5);
    assert_eq!(forecast.current.wind_speed_kmh, 14.5);
    assert_eq!(forecast.current.weather_code, 3);
    assert_eq!(forecast.chart.series.labels.len(), 24);
    assert_eq!(forecast.hourly.len(), 24);
    assert_eq!(forecast.daily.len(), 3);
    assert!(forecast.is_day_time);
    assert_eq!(forecast.hourly.iter().filter(|h| h.is_current_hour).count(), 1);
}

#[tokio::test]
async fn not_found_skips_fetch_and_keeps_previous_forecast() {
    let fetcher = Arc::new(StubFetcher::default());
    let dashboard = Dashboard::new(
        StubGeocoder::default().with("London", 51.5, -0.12, 0),
        Arc::clone(&fetcher),
    );

    assert_eq!(dashboard.submit("London").await, SubmitOutcome::Applied);
    let before = dashboard.state().forecast;

    assert_eq!(dashboard.submit("Atlantis").await, SubmitOutcome::Failed);

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    let after = dashboard.state();
    assert_eq!(after.forecast, before);
    assert!(after.error.unwrap().contains("Atlantis"));
    assert_eq!(dashboard.location().unwrap().coordinates, None);
}

#[tokio::test]
async fn not_found_on_fresh_session_makes_no_fetch() {
    let fetcher = Arc::new(StubFetcher::default());
    let dashboard = Dashboard::new(StubGeocoder::default(), Arc::clone(&fetcher));

    assert_eq!(dashboard.submit("Atlantis").await, SubmitOutcome::Failed);

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert!(dashboard.state().forecast.is_none());
    let view = dashboard.view(noon());
    assert_eq!(view.screen, Screen::Empty);
    assert_eq!(view.error.as_deref(), Some("Location 'Atlantis' not found"));
}

#[tokio::test]
async fn first_submit_shows_loading_until_it_settles() {
    let dashboard = Dashboard::new(
        StubGeocoder::default().with("Oslo", 59.9, 10.75, 100),
        StubFetcher::default(),
    );

    let submit = dashboard.submit("Oslo");
    let peek = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        dashboard.view(noon()).screen
    };
    let (outcome, during) = tokio::join!(submit, peek);

    assert_eq!(during, Screen::Loading);
    assert_eq!(outcome, SubmitOutcome::Applied);
    assert!(matches!(dashboard.view(noon()).screen, Screen::Ready(_)));
}

#[tokio::test]
async fn forecast_without_hourly_data_is_still_ready() {
    let dashboard = Dashboard::new(
        StubGeocoder::default().with("Reykjavik", 64.1, -21.9, 0),
        StubFetcher {
            no_hourly: true,
            ..Default::default()
        },
    );

    assert_eq!(dashboard.submit("Reykjavik").await, SubmitOutcome::Applied);

    let Screen::Ready(forecast) = dashboard.view(noon()).screen else {
        panic!("expected a ready screen");
    };
    assert!(forecast.hourly.is_empty());
    assert_eq!(forecast.current.temperature_c, 64.1);
    assert_eq!(forecast.daily.len(), 3);
}

#[tokio::test]
async fn fetch_failure_sets_error_and_success_clears_it() {
    let failing = Dashboard::new(
        StubGeocoder::default().with("Paris", 48.85, 2.35, 0),
        StubFetcher {
            fail: true,
            ..Default::default()
        },
    );
    assert_eq!(failing.submit("Paris").await, SubmitOutcome::Failed);
    assert!(failing.error().unwrap().contains("boom"));
    assert!(failing.state().forecast.is_none());

    let dashboard = Dashboard::new(
        StubGeocoder::default().with("Paris", 48.85, 2.35, 0),
        StubFetcher::default(),
    );
    assert_eq!(dashboard.submit("Nowhere").await, SubmitOutcome::Failed);
    assert!(dashboard.error().is_some());

    assert_eq!(dashboard.submit("Paris").await, SubmitOutcome::Applied);
    assert_eq!(dashboard.error(), None);
}

#[tokio::test]
async fn later_submit_wins_even_when_earlier_response_arrives_last() {
    let dashboard = Dashboard::new(
        StubGeocoder::default()
            .with("Slow", 10.0, 0.0, 200)
            .with("Fast", 20.0, 0.0, 0),
        StubFetcher::default(),
    );

    let slow = dashboard.submit("Slow");
    let fast = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        dashboard.submit("Fast").await
    };
    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

    assert_eq!(slow_outcome, SubmitOutcome::Superseded);
    assert_eq!(fast_outcome, SubmitOutcome::Applied);

    let state = dashboard.state();
    assert_eq!(state.location.unwrap().name, "Fast");
    assert_eq!(state.forecast.unwrap().current.temperature_c, 20.0);
}

#[tokio::test]
async fn superseded_failure_does_not_set_error() {
    let dashboard = Dashboard::new(
        StubGeocoder::default().with("Fast", 20.0, 0.0, 100).missing_after(50),
        StubFetcher::default(),
    );

    // "Missing" fails only after "Fast" has been issued.
    let missing = dashboard.submit("Missing");
    let fast = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        dashboard.submit("Fast").await
    };
    let (missing_outcome, fast_outcome) = tokio::join!(missing, fast);

    assert_eq!(missing_outcome, SubmitOutcome::Superseded);
    assert_eq!(fast_outcome, SubmitOutcome::Applied);
    assert_eq!(dashboard.error(), None);
}

#[tokio::test]
async fn empty_session_renders_empty_screen() {
    let dashboard = Dashboard::new(StubGeocoder::default(), StubFetcher::default());
    let view = dashboard.view(noon());

    assert_eq!(view.screen, Screen::Empty);
    assert_eq!(view.error, None);
}
