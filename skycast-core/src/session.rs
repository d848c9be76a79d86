//! Session state of the dashboard and the submit pipeline that updates it.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
    error::ResolveError,
    model::{Coordinates, ForecastPayload, Location},
    provider::{ForecastFetcher, Geocoder},
    view::{ForecastView, build_view},
};

/// Everything the dashboard knows at one moment. Only [`Dashboard::submit`] mutates it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub location: Option<Location>,
    pub forecast: Option<ForecastPayload>,
    pub error: Option<String>,
}

/// What happened to one submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied,
    Failed,
    /// A later submit was issued before this one completed; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// No forecast has been applied and nothing is in flight.
    Empty,
    /// No forecast yet, but a submit is still running.
    Loading,
    Ready(Box<ForecastView>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub screen: Screen,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct Dashboard<G, F> {
    geocoder: G,
    fetcher: F,
    state: Mutex<SessionState>,
    latest_ticket: AtomicU64,
    settled_ticket: AtomicU64,
}

impl<G: Geocoder, F: ForecastFetcher> Dashboard<G, F> {
    pub fn new(geocoder: G, fetcher: F) -> Self {
        Self {
            geocoder,
            fetcher,
            state: Mutex::new(SessionState::default()),
            latest_ticket: AtomicU64::new(0),
            settled_ticket: AtomicU64::new(0),
        }
    }

    /// Record `text` as the location to resolve, then geocode and fetch it.
    ///
    /// Only the most recently issued submit may update the session; earlier
    /// ones that finish later are dropped.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let ticket = {
            let mut state = self.state.lock();
            state.location = Some(Location::unresolved(text));
            self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1
        };

        let coordinates = match self.geocoder.resolve(text).await {
            Ok(coordinates) => coordinates,
            Err(err) => return self.fail(ticket, text, err),
        };

        if !self.set_coordinates(ticket, coordinates) {
            return self.superseded(ticket, text);
        }

        match self.fetcher.fetch(coordinates).await {
            Ok(payload) => self.apply(ticket, text, payload),
            Err(err) => self.fail(ticket, text, ResolveError::Transport(err)),
        }
    }

    /// Derive the render-ready view. Day/night and the chart marker follow `now`.
    pub fn view(&self, now: DateTime<Utc>) -> DashboardView {
        let state = self.state.lock();

        let screen = match (&state.location, &state.forecast) {
            (Some(location), Some(forecast)) => {
                Screen::Ready(Box::new(build_view(location, forecast, now)))
            }
            _ if self.is_pending() => Screen::Loading,
            _ => Screen::Empty,
        };

        DashboardView {
            screen,
            error: state.error.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn location(&self) -> Option<Location> {
        self.state.lock().location.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket.load(Ordering::SeqCst) == ticket
    }

    fn is_pending(&self) -> bool {
        self.settled_ticket.load(Ordering::SeqCst) != self.latest_ticket.load(Ordering::SeqCst)
    }

    fn settle(&self, ticket: u64) {
        self.settled_ticket.store(ticket, Ordering::SeqCst);
    }

    fn set_coordinates(&self, ticket: u64, coordinates: Coordinates) -> bool {
        let mut state = self.state.lock();
        if !self.is_latest(ticket) {
            return false;
        }
        if let Some(location) = state.location.as_mut() {
            location.coordinates = Some(coordinates);
        }
        true
    }

    fn apply(&self, ticket: u64, text: &str, payload: ForecastPayload) -> SubmitOutcome {
        let mut state = self.state.lock();
        if !self.is_latest(ticket) {
            drop(state);
            return self.superseded(ticket, text);
        }

        tracing::info!(
            location = text,
            temperature_c = payload.current.temperature_c,
            code = payload.current.weather_code,
            "Applied forecast"
        );
        state.forecast = Some(payload);
        state.error = None;
        self.settle(ticket);
        SubmitOutcome::Applied
    }

    fn fail(&self, ticket: u64, text: &str, err: ResolveError) -> SubmitOutcome {
        let mut state = self.state.lock();
        if !self.is_latest(ticket) {
            drop(state);
            return self.superseded(ticket, text);
        }

        match &err {
            ResolveError::NotFound(_) => tracing::warn!(location = text, "Location not found"),
            ResolveError::Transport(e) => {
                tracing::warn!(location = text, error = %e, "Error fetching weather data")
            }
        }
        state.error = Some(err.to_string());
        self.settle(ticket);
        SubmitOutcome::Failed
    }

    fn superseded(&self, ticket: u64, text: &str) -> SubmitOutcome {
        tracing::debug!(ticket, location = text, "Dropping result of superseded submit");
        SubmitOutcome::Superseded
    }
}
