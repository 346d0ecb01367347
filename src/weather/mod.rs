//! Weather data access.
//!
//! Provides a trait-based interface over weather services, with an
//! OpenWeatherMap implementation.

mod models;
mod openweather;

pub use models::{
    Forecast, ForecastEntry, GeoLocation, Location, Observation, Temperature, Units,
};
pub use openweather::OpenWeatherClient;

use crate::error::{BreezeError, Result};
use async_trait::async_trait;

/// Trait for weather data sources.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Unit system readings are reported in.
    fn units(&self) -> Units;

    /// Current weather for a place name and optional country code.
    async fn current_at_place(&self, city: &str, country: Option<&str>) -> Result<Observation>;

    /// Current weather at coordinates.
    async fn current_at_coords(&self, lat: f64, lon: f64) -> Result<Observation>;

    /// 3-hourly forecast, limited to `periods` entries.
    async fn forecast_at_place(
        &self,
        city: &str,
        country: Option<&str>,
        periods: usize,
    ) -> Result<Forecast>;

    /// Resolve a place name to coordinates. An unknown place is `WeatherNotFound`.
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoLocation>>;

    /// Current weather at the first geocoding match for a place name.
    async fn current_at_geocoded(&self, city: &str, country: Option<&str>) -> Result<Observation> {
        let query = place_query(city, country);
        let place = self
            .geocode(&query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(BreezeError::WeatherNotFound(query))?;
        self.current_at_coords(place.lat, place.lon).await
    }
}

/// `city` or `city,country` as the weather APIs expect it.
pub(crate) fn place_query(city: &str, country: Option<&str>) -> String {
    match country.map(str::trim).filter(|c| !c.is_empty()) {
        Some(country) => format!("{},{}", city.trim(), country),
        None => city.trim().to_string(),
    }
}
