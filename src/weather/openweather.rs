//! OpenWeatherMap HTTP client.

use super::models::{RawApiError, RawCurrent, RawForecast, RawGeo};
use super::{place_query, Forecast, GeoLocation, Observation, Units, WeatherProvider};
use crate::config::WeatherSettings;
use crate::error::{BreezeError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for the OpenWeatherMap current weather, forecast and geocoding APIs.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    units: Units,
}

impl OpenWeatherClient {
    /// Create a client from weather settings. Fails if no API key is set.
    pub fn new(settings: &WeatherSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                BreezeError::Config(
                    "OPENWEATHERMAP_API_KEY not set. Add it to your .env file.".to_string(),
                )
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            units: settings.units,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RawApiError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            Err(BreezeError::WeatherNotFound(format!("{} ({})", subject, message)))
        } else {
            Err(BreezeError::Weather(format!("HTTP {}: {}", status.as_u16(), message)))
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn units(&self) -> Units {
        self.units
    }

    #[instrument(skip(self))]
    async fn current_at_place(&self, city: &str, country: Option<&str>) -> Result<Observation> {
        let place = place_query(city, country);
        let raw: RawCurrent = self
            .get_json(
                "/data/2.5/weather",
                &[("q", place.clone()), ("units", self.units.as_query().to_string())],
                &place,
            )
            .await?;
        Ok(raw.into_observation(self.units))
    }

    #[instrument(skip(self))]
    async fn current_at_coords(&self, lat: f64, lon: f64) -> Result<Observation> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(BreezeError::InvalidInput(format!(
                "Coordinates out of range: {}, {}",
                lat, lon
            )));
        }
        let raw: RawCurrent = self
            .get_json(
                "/data/2.5/weather",
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("units", self.units.as_query().to_string()),
                ],
                &format!("{}, {}", lat, lon),
            )
            .await?;
        Ok(raw.into_observation(self.units))
    }

    #[instrument(skip(self))]
    async fn forecast_at_place(
        &self,
        city: &str,
        country: Option<&str>,
        periods: usize,
    ) -> Result<Forecast> {
        let place = place_query(city, country);
        let raw: RawForecast = self
            .get_json(
                "/data/2.5/forecast",
                &[
                    ("q", place.clone()),
                    ("cnt", periods.to_string()),
                    ("units", self.units.as_query().to_string()),
                ],
                &place,
            )
            .await?;
        Ok(raw.into_forecast(self.units, periods))
    }

    #[instrument(skip(self))]
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoLocation>> {
        let raw: Vec<RawGeo> = self
            .get_json(
                "/geo/1.0/direct",
                &[("q", query.trim().to_string()), ("limit", limit.to_string())],
                query,
            )
            .await?;
        if raw.is_empty() {
            return Err(BreezeError::WeatherNotFound(query.trim().to_string()));
        }
        Ok(raw.into_iter().map(GeoLocation::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": 14.2, "feels_like": 13.6, "temp_min": 12.9, "temp_max": 15.3, "pressure": 1012, "humidity": 77},
        "wind": {"speed": 4.63, "deg": 240},
        "dt": 1700000000,
        "sys": {"country": "GB", "sunrise": 1699975000, "sunset": 1700008000},
        "name": "London",
        "cod": 200
    }"#;

    fn client(base_url: &str) -> OpenWeatherClient {
        OpenWeatherClient::new(&WeatherSettings {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let result = OpenWeatherClient::new(&WeatherSettings::default());
        assert!(matches!(result, Err(BreezeError::Config(_))));
    }

    #[test]
    fn test_place_query() {
        assert_eq!(place_query("London", Some("GB")), "London,GB");
        assert_eq!(place_query(" Chennai ", Some("")), "Chennai");
        assert_eq!(place_query("Paris", None), "Paris");
    }

    #[tokio::test]
    async fn test_current_at_place() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "London,GB".into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
                Matcher::UrlEncoded("appid".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LONDON)
            .create_async()
            .await;

        let obs = client(&server.url())
            .current_at_place("London", Some("GB"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(obs.location.name, "London");
        assert_eq!(obs.temperature.temp, 14.2);
        assert_eq!(obs.detailed_status, "broken clouds");
        assert!(obs.visibility.is_none());
    }

    #[tokio::test]
    async fn test_unknown_city_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"cod": "404", "message": "city not found"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .current_at_place("Atlantis", Some("US"))
            .await
            .unwrap_err();

        match err {
            BreezeError::WeatherNotFound(msg) => {
                assert!(msg.contains("Atlantis,US"));
                assert!(msg.contains("city not found"));
            }
            other => panic!("Expected WeatherNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_key_is_weather_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"cod": 401, "message": "Invalid API key"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .current_at_coords(44.34, 10.99)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Weather service error: HTTP 401: Invalid API key");
    }

    #[tokio::test]
    async fn test_coords_out_of_range() {
        let err = client("http://127.0.0.1:9")
            .current_at_coords(120.0, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, BreezeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_forecast_truncates_periods() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data/2.5/forecast")
            .match_query(Matcher::UrlEncoded("cnt".into(), "2".into()))
            .with_status(200)
            .with_body(
                r#"{
                "cod": "200",
                "list": [
                    {"dt": 1700010800, "main": {"temp": 7.1, "feels_like": 5.0, "temp_min": 6.0, "temp_max": 7.5, "pressure": 1020, "humidity": 60}, "weather": [{"main": "Clear", "description": "clear sky"}], "wind": {"speed": 3.0}},
                    {"dt": 1700021600, "main": {"temp": 6.4, "feels_like": 4.2, "temp_min": 6.0, "temp_max": 6.9, "pressure": 1021, "humidity": 63}, "weather": [{"main": "Clouds", "description": "few clouds"}], "wind": {"speed": 2.5}},
                    {"dt": 1700032400, "main": {"temp": 5.9, "feels_like": 3.8, "temp_min": 5.5, "temp_max": 6.1, "pressure": 1021, "humidity": 66}, "weather": [{"main": "Clouds", "description": "few clouds"}], "wind": {"speed": 2.1}}
                ],
                "city": {"name": "New York", "coord": {"lat": 40.7143, "lon": -74.006}, "country": "US"}
            }"#,
            )
            .create_async()
            .await;

        let forecast = client(&server.url())
            .forecast_at_place("New York", Some("US"), 2)
            .await
            .unwrap();

        assert_eq!(forecast.entries.len(), 2);
        assert_eq!(forecast.entries[1].detailed_status, "few clouds");
        assert!(forecast.summary().starts_with("Forecast for New York, US"));
    }

    #[tokio::test]
    async fn test_geocode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "London,GB".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"name": "London", "lat": 51.5073, "lon": -0.1276, "country": "GB", "state": "England"}]"#)
            .create_async()
            .await;

        let places = client(&server.url()).geocode("London,GB", 1).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].state.as_deref(), Some("England"));
        assert_eq!(places[0].lat, 51.5073);
    }

    #[tokio::test]
    async fn test_geocode_without_matches_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::UrlEncoded("q".into(), "Atlantis".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let err = client(&server.url()).geocode(" Atlantis ", 5).await.unwrap_err();
        match err {
            BreezeError::WeatherNotFound(query) => assert_eq!(query, "Atlantis"),
            other => panic!("Expected WeatherNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_current_at_geocoded_uses_first_match() {
        let mut server = mockito::Server::new_async().await;
        let geo = server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "London,GB".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"name": "London", "lat": 51.5085, "lon": -0.1257, "country": "GB"}]"#)
            .create_async()
            .await;
        let weather = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "51.5085".into()),
                Matcher::UrlEncoded("lon".into(), "-0.1257".into()),
            ]))
            .with_status(200)
            .with_body(LONDON)
            .create_async()
            .await;

        let obs = client(&server.url())
            .current_at_geocoded("London", Some("GB"))
            .await
            .unwrap();

        geo.assert_async().await;
        weather.assert_async().await;
        assert_eq!(obs.location.name, "London");
        assert_eq!(obs.location.lat, 51.5085);
    }

    #[tokio::test]
    async fn test_current_at_geocoded_unknown_place_skips_weather() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let weather = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client(&server.url())
            .current_at_geocoded("Atlantis", None)
            .await
            .unwrap_err();

        weather.assert_async().await;
        assert!(matches!(err, BreezeError::WeatherNotFound(q) if q == "Atlantis"));
    }
}
