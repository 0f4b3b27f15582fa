/// Icon categories for a condition description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    ClearSky,
    Cloud,
    Rain,
    Snow,
}

/// Picks an icon by the first matching keyword. Order matters: "cloud" is tested
/// before "rain", so "light rain and clouds" gets the cloud icon.
pub fn weather_icon(condition: &str) -> WeatherIcon {
    let lower = condition.to_lowercase();

    if lower.contains("sunny") || lower.contains("clear") {
        WeatherIcon::ClearSky
    } else if lower.contains("cloud") {
        WeatherIcon::Cloud
    } else if lower.contains("rain") || lower.contains("drizzle") {
        WeatherIcon::Rain
    } else if lower.contains("snow") {
        WeatherIcon::Snow
    } else {
        WeatherIcon::Cloud
    }
}
