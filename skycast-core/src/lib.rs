//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Geocoding and forecast providers behind async traits
//! - The validated forecast model and the pure view-model builder
//! - Weather-code categories and icon rendering strategies
//! - The dashboard session that runs the submit pipeline
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but the session can drive any front-end.

pub mod condition;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;
pub mod view;

pub use condition::{EmojiIcons, IconRenderer, IconStyle, ImageIcons, WeatherCategory};
pub use config::{Config, ProviderConfig};
pub use error::{MisalignedSeries, ResolveError, TransportError};
pub use model::{
    Coordinates, CurrentConditions, DailySeries, ForecastPayload, HourlySeries, Location,
};
pub use provider::{ForecastFetcher, Geocoder, GeocoderId};
pub use session::{Dashboard, DashboardView, Screen, SessionState, SubmitOutcome};
pub use view::{ChartSeries, DailyEntry, ForecastView, HourlyEntry};
