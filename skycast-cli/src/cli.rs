use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{InquireError, Password, Select, Text, validator::Validation};
use skycast_core::{
    Config, Dashboard, ForecastFetcher, Geocoder, GeocoderId, IconStyle, SubmitOutcome,
    provider::{default_geocoder_from_config, geocoder_from_config, openmeteo::OpenMeteoForecast},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a geocoder (API key) and the preferred icon style.
    Configure {
        /// Geocoder short name, "opencage" or "open-meteo".
        geocoder: String,
    },

    /// Show the dashboard for one location and exit.
    Show {
        /// Location name, e.g. "London".
        location: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Prompt for locations repeatedly, redrawing the dashboard after each submit.
    Interactive {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct DisplayArgs {
    /// Icon style; defaults to the configured one.
    #[arg(long, value_enum)]
    icons: Option<IconArg>,

    /// Geocoder to use; defaults to the configured one.
    #[arg(long)]
    geocoder: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IconArg {
    Image,
    Emoji,
}

impl From<IconArg> for IconStyle {
    fn from(value: IconArg) -> Self {
        match value {
            IconArg::Image => IconStyle::Image,
            IconArg::Emoji => IconStyle::Emoji,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { geocoder } => configure(&geocoder),
            Command::Show { location, display } => {
                let (dashboard, icons) = build_dashboard(&display)?;
                let outcome = dashboard.submit(&location).await;
                let renderer = icons.renderer();
                println!("{}", render::render(&dashboard.view(Utc::now()), renderer.as_ref()));

                if outcome == SubmitOutcome::Failed {
                    bail!("Could not load weather for '{location}'");
                }
                Ok(())
            }
            Command::Interactive { display } => {
                let (dashboard, icons) = build_dashboard(&display)?;
                interactive(&dashboard, icons).await
            }
        }
    }
}

fn configure(geocoder: &str) -> anyhow::Result<()> {
    let id = GeocoderId::try_from(geocoder)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let api_key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .with_validator(|input: &str| {
                Ok(if input.trim().is_empty() {
                    Validation::Invalid("API key must not be empty".into())
                } else {
                    Validation::Valid
                })
            })
            .prompt()
            .context("Failed to read API key")?;
        config.upsert_provider_api_key(id, api_key.trim().to_string());
    }
    config.set_default_geocoder(id);

    let style = Select::new("Icon style:", IconStyle::all().to_vec())
        .prompt()
        .context("Failed to read icon style")?;
    config.set_icon_style(style);

    let path = config.save()?;
    println!("Saved configuration for {id} to {}", path.display());
    Ok(())
}

fn build_dashboard(
    args: &DisplayArgs,
) -> anyhow::Result<(Dashboard<Box<dyn Geocoder>, OpenMeteoForecast>, IconStyle)> {
    let config = Config::load()?;

    let geocoder = match args.geocoder.as_deref() {
        Some(name) => geocoder_from_config(GeocoderId::try_from(name)?, &config)?,
        None => default_geocoder_from_config(&config)?,
    };
    let icons = match args.icons {
        Some(arg) => arg.into(),
        None => config.icon_style()?,
    };

    tracing::debug!(
        geocoder = args.geocoder.as_deref().unwrap_or("default"),
        %icons,
        "Dashboard ready"
    );
    Ok((Dashboard::new(geocoder, OpenMeteoForecast::new()), icons))
}

async fn interactive<G: Geocoder, F: ForecastFetcher>(
    dashboard: &Dashboard<G, F>,
    icons: IconStyle,
) -> anyhow::Result<()> {
    let renderer = icons.renderer();
    println!("{}", render::render(&dashboard.view(Utc::now()), renderer.as_ref()));

    loop {
        let input = Text::new("Location:")
            .with_placeholder("Enter location (e.g., London)")
            .with_validator(|input: &str| {
                Ok(if input.trim().is_empty() {
                    Validation::Invalid("Please enter a location".into())
                } else {
                    Validation::Valid
                })
            })
            .prompt();

        let location = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read location"),
        };

        dashboard.submit(location.trim()).await;
        println!("{}", render::render(&dashboard.view(Utc::now()), renderer.as_ref()));
    }

    Ok(())
}
