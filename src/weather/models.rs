//! Weather data types and OpenWeatherMap response parsing.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Unit system for temperatures and wind speed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres per second.
    #[default]
    Metric,
    /// Fahrenheit, miles per hour.
    Imperial,
    /// Kelvin, metres per second.
    Standard,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "celsius" => Ok(Units::Metric),
            "imperial" | "fahrenheit" => Ok(Units::Imperial),
            "standard" | "kelvin" => Ok(Units::Standard),
            _ => Err(format!("Unknown units: {}", s)),
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_query())
    }
}

/// Where an observation was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.country {
            Some(country) if !self.name.is_empty() => write!(f, "{}, {}", self.name, country),
            _ if !self.name.is_empty() => write!(f, "{}", self.name),
            _ => write!(f, "{:.4}, {:.4}", self.lat, self.lon),
        }
    }
}

/// Temperature readings in the observation's units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub temp: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

/// Current weather at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub location: Location,
    pub reference_time: DateTime<Utc>,
    pub units: Units,
    pub temperature: Temperature,
    /// Relative humidity in percent.
    pub humidity: u32,
    /// Atmospheric pressure in hPa.
    pub pressure: f64,
    pub wind_speed: f64,
    /// Visibility in metres, when reported.
    pub visibility: Option<u32>,
    /// Short condition group, e.g. "Rain".
    pub status: String,
    /// Detailed condition, e.g. "moderate rain".
    pub detailed_status: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl Observation {
    /// Multi-line report handed to the model and printed by the CLI.
    pub fn summary(&self) -> String {
        let t = self.units.temperature_symbol();
        let visibility = self
            .visibility
            .map(|v| format!("{} m", v))
            .unwrap_or_else(|| "N/A".to_string());

        let mut lines = vec![
            format!("Weather in {}", self.location),
            format!("Conditions: {}", self.detailed_status),
            format!(
                "Temperature: {:.1}{t} (feels like {:.1}{t}, min {:.1}{t}, max {:.1}{t})",
                self.temperature.temp,
                self.temperature.feels_like,
                self.temperature.min,
                self.temperature.max,
            ),
            format!("Humidity: {}%", self.humidity),
            format!("Pressure: {:.0} hPa", self.pressure),
            format!("Wind speed: {:.1} {}", self.wind_speed, self.units.speed_symbol()),
            format!("Visibility: {}", visibility),
        ];
        if let Some(sunrise) = self.sunrise {
            lines.push(format!("Sunrise: {}", sunrise.to_rfc3339()));
        }
        if let Some(sunset) = self.sunset {
            lines.push(format!("Sunset: {}", sunset.to_rfc3339()));
        }
        lines.push(format!("Observed at: {}", self.reference_time.to_rfc3339()));
        lines.join("\n")
    }
}

/// One 3-hour forecast period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub detailed_status: String,
    pub wind_speed: f64,
}

/// Forecast for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location: Location,
    pub units: Units,
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Forecast for {}", self.location)];
        lines.extend(self.entries.iter().map(|e| {
            format!(
                "{}: {:.1}{} - {}",
                e.time.format("%Y-%m-%d %H:%M UTC"),
                e.temperature,
                self.units.temperature_symbol(),
                e.detailed_status
            )
        }));
        lines.join("\n")
    }
}

/// A geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

// Raw OpenWeatherMap payloads.

#[derive(Debug, Deserialize)]
pub(crate) struct RawCurrent {
    #[serde(default)]
    name: String,
    coord: RawCoord,
    #[serde(default)]
    weather: Vec<RawCondition>,
    main: RawMain,
    visibility: Option<u32>,
    wind: RawWind,
    dt: i64,
    #[serde(default)]
    sys: RawSys,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawForecast {
    list: Vec<RawForecastItem>,
    city: RawCity,
}

#[derive(Debug, Deserialize)]
struct RawForecastItem {
    dt: i64,
    main: RawMain,
    #[serde(default)]
    weather: Vec<RawCondition>,
    wind: RawWind,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    #[serde(default)]
    name: String,
    coord: RawCoord,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct RawWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RawSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeo {
    name: String,
    lat: f64,
    lon: f64,
    country: Option<String>,
    state: Option<String>,
}

/// Error body returned by the API on failures.
#[derive(Debug, Deserialize)]
pub(crate) struct RawApiError {
    pub message: String,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn condition(weather: &[RawCondition]) -> (String, String) {
    weather
        .first()
        .map(|c| (c.main.clone(), c.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()))
}

impl RawCurrent {
    pub(crate) fn into_observation(self, units: Units) -> Observation {
        let (status, detailed_status) = condition(&self.weather);
        Observation {
            location: Location {
                name: self.name,
                country: self.sys.country,
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
            reference_time: timestamp(self.dt),
            units,
            temperature: Temperature {
                temp: self.main.temp,
                feels_like: self.main.feels_like,
                min: self.main.temp_min,
                max: self.main.temp_max,
            },
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            wind_speed: self.wind.speed,
            visibility: self.visibility,
            status,
            detailed_status,
            sunrise: self.sys.sunrise.map(timestamp),
            sunset: self.sys.sunset.map(timestamp),
        }
    }
}

impl RawForecast {
    pub(crate) fn into_forecast(self, units: Units, periods: usize) -> Forecast {
        Forecast {
            location: Location {
                name: self.city.name,
                country: self.city.country,
                lat: self.city.coord.lat,
                lon: self.city.coord.lon,
            },
            units,
            entries: self
                .list
                .into_iter()
                .take(periods)
                .map(|item| ForecastEntry {
                    time: timestamp(item.dt),
                    temperature: item.main.temp,
                    detailed_status: condition(&item.weather).1,
                    wind_speed: item.wind.speed,
                })
                .collect(),
        }
    }
}

impl From<RawGeo> for GeoLocation {
    fn from(raw: RawGeo) -> Self {
        Self {
            name: raw.name,
            country: raw.country,
            state: raw.state,
            lat: raw.lat,
            lon: raw.lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZOCCA: &str = r#"{
        "coord": {"lon": 10.99, "lat": 44.34},
        "weather": [{"id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d"}],
        "base": "stations",
        "main": {"temp": 298.48, "feels_like": 298.74, "temp_min": 297.56, "temp_max": 300.05, "pressure": 1015, "humidity": 64},
        "visibility": 10000,
        "wind": {"speed": 0.62, "deg": 349},
        "dt": 1661870592,
        "sys": {"country": "IT", "sunrise": 1661834187, "sunset": 1661882248},
        "timezone": 7200,
        "name": "Zocca",
        "cod": 200
    }"#;

    #[test]
    fn test_parse_current() {
        let raw: RawCurrent = serde_json::from_str(ZOCCA).unwrap();
        let obs = raw.into_observation(Units::Standard);

        assert_eq!(obs.location.to_string(), "Zocca, IT");
        assert_eq!(obs.humidity, 64);
        assert_eq!(obs.pressure, 1015.0);
        assert_eq!(obs.visibility, Some(10000));
        assert_eq!(obs.status, "Rain");
        assert_eq!(obs.detailed_status, "moderate rain");
        assert_eq!(obs.sunrise.unwrap().timestamp(), 1661834187);
    }

    #[test]
    fn test_summary_without_visibility() {
        let mut raw: RawCurrent = serde_json::from_str(ZOCCA).unwrap();
        raw.visibility = None;
        let summary = raw.into_observation(Units::Metric).summary();

        assert!(summary.starts_with("Weather in Zocca, IT"));
        assert!(summary.contains("Temperature: 298.5°C"));
        assert!(summary.contains("Visibility: N/A"));
        assert!(summary.contains("Humidity: 64%"));
    }

    #[test]
    fn test_units_parsing() {
        assert_eq!("Celsius".parse::<Units>().unwrap(), Units::Metric);
        assert_eq!("imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert!("furlongs".parse::<Units>().is_err());
        assert_eq!(Units::Imperial.speed_symbol(), "mph");
    }

    #[test]
    fn test_location_display_falls_back_to_coords() {
        let location = Location {
            name: String::new(),
            country: None,
            lat: 35.6762,
            lon: 139.6503,
        };
        assert_eq!(location.to_string(), "35.6762, 139.6503");
    }
}
