//! Terminal output for each lookup state.

use weather_core::{LookupState, WeatherIcon, WeatherReading, weather_icon};

const SPINNER: &str = "\u{25cc}";
const ERROR_ICON: &str = "\u{26a0}\u{fe0f}";

pub fn banner() -> String {
    "Get Weather Details\nReal-time weather updates\n".to_string()
}

/// Exactly one of spinner, error banner, or weather card; nothing at all when idle.
pub fn render(state: &LookupState) -> String {
    match state {
        LookupState::Idle => String::new(),
        LookupState::Loading => format!("{SPINNER} Loading weather data..."),
        LookupState::Error(message) => format!("{ERROR_ICON} {message}"),
        LookupState::Loaded(reading) => card(reading),
    }
}

pub fn glyph(icon: WeatherIcon) -> &'static str {
    match icon {
        WeatherIcon::ClearSky => "\u{2600}\u{fe0f}",
        WeatherIcon::Cloud => "\u{2601}\u{fe0f}",
        WeatherIcon::Rain => "\u{1f327}\u{fe0f}",
        WeatherIcon::Snow => "\u{1f328}\u{fe0f}",
    }
}

fn card(r: &WeatherReading) -> String {
    let mut lines = vec![
        format!("\u{1f4cd} {}", r.place_name),
        format!("   {}", r.region),
        String::new(),
        format!("{}  {}\u{b0}", glyph(weather_icon(&r.condition_text)), r.temperature_celsius),
        format!("   {}", r.condition_text),
        String::new(),
        format!("  Humidity     {}%", r.humidity_percent),
        format!("  Wind Speed   {} m/s", r.wind_speed),
        format!("  Pressure     {} mb", r.pressure_millibar),
        format!("  Visibility   {} km", r.visibility_kilometers),
    ];
    if let Some(at) = r.observed_at {
        lines.push(format!("  Observed     {}", at.format("%H:%M UTC")));
    }
    lines.join("\n")
}

/// Fixed reading for `weather demo`.
pub fn demo_reading() -> WeatherReading {
    WeatherReading {
        place_name: "New York".into(),
        region: "United States".into(),
        temperature_celsius: 22,
        condition_text: "Partly Cloudy".into(),
        humidity_percent: 65,
        pressure_millibar: 1013,
        wind_speed: 15.0,
        visibility_kilometers: 10.0,
        observed_at: None,
    }
}
