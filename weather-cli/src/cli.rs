use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use std::{process::ExitCode, sync::Arc};

use weather_core::{
    Config, LookupState, WeatherLookup, locator_from_config, provider_from_config,
};

use crate::render;

/// Typing this at the prompt leaves interactive mode.
const QUIT_COMMAND: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a city or your location")]
pub struct Cli {
    /// More log output on stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Look up the weather once and print it.
    Show {
        /// City or place name.
        #[arg(required_unless_present = "lat", conflicts_with = "lat")]
        city: Option<String>,

        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Detect your location, then search cities from a prompt.
    Interactive {
        /// Skip the startup location lookup.
        #[arg(long)]
        no_locate: bool,
    },

    /// Print a sample reading without calling the provider.
    Demo,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command.unwrap_or(Command::Interactive { no_locate: false }) {
            Command::Configure => configure().await,
            Command::Show { city, lat, lon } => show(city, lat.zip(lon)).await,
            Command::Interactive { no_locate } => interactive(no_locate).await,
            Command::Demo => {
                println!("{}", render::render(&LookupState::Loaded(render::demo_reading())));
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Config with the environment override applied; the key must be present.
fn runtime_config() -> Result<(Config, WeatherLookup)> {
    let mut config = Config::load()?;
    config.apply_env();
    let provider = provider_from_config(&config)?;
    Ok((config, WeatherLookup::new(Arc::from(provider))))
}

async fn configure() -> Result<ExitCode> {
    let mut config = Config::load()?;

    let key = tokio::task::spawn_blocking(|| {
        Password::new("OpenWeather API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
    })
    .await
    .context("API key prompt panicked")?
    .context("Failed to read API key")?;

    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key);
    let path = config.save()?;
    println!("Saved API key to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn show(city: Option<String>, position: Option<(f64, f64)>) -> Result<ExitCode> {
    let (_config, lookup) = runtime_config()?;

    let state = match (position, city) {
        (Some((lat, lon)), _) => lookup.fetch_by_coordinates(lat, lon).await,
        (None, Some(city)) => lookup.fetch_by_text(&city).await,
        (None, None) => bail!("Give a city name or --lat/--lon"),
    };
    lookup.teardown();

    print_state(&state);
    Ok(match state {
        LookupState::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn interactive(no_locate: bool) -> Result<ExitCode> {
    let (config, lookup) = runtime_config()?;

    println!("{}", render::banner());

    if !no_locate {
        let locator = locator_from_config(&config);
        println!("Detecting your location...");
        let state = lookup.locate_and_fetch(locator.as_ref()).await;
        print_state(&state);
    }

    while let Some(input) = prompt_city(lookup.query_text()).await? {
        if input.trim() == QUIT_COMMAND {
            break;
        }
        lookup.set_query_text(input.clone());

        match lookup.start_text(&input) {
            Ok(pending) => {
                print_state(&lookup.state());
                let state = lookup.run(pending).await;
                print_state(&state);
            }
            Err(_) => print_state(&lookup.state()),
        }
    }

    lookup.teardown();
    tracing::debug!("interactive session closed");
    Ok(ExitCode::SUCCESS)
}

/// `None` when the user cancels (Esc / Ctrl-C).
async fn prompt_city(initial: String) -> Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(move || {
        Text::new("City:")
            .with_placeholder("Enter city name...")
            .with_initial_value(&initial)
            .with_help_message("Enter to search, Esc or :q to quit")
            .prompt()
    })
    .await
    .context("City prompt panicked")?;

    match answer {
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read city name"),
    }
}

fn print_state(state: &LookupState) {
    let out = render::render(state);
    if !out.is_empty() {
        println!("{out}");
    }
}
