//! Direct weather queries.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, WeatherAction};
use crate::config::Settings;
use crate::error::BreezeError;
use crate::weather::{OpenWeatherClient, WeatherProvider};
use anyhow::Result;

/// Run the weather command.
pub async fn run_weather(action: &WeatherAction, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Weather, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let client = OpenWeatherClient::new(&settings.weather)?;
    let default_country = Some(settings.weather.default_country.as_str()).filter(|c| !c.is_empty());

    match action {
        WeatherAction::Current {
            city,
            country,
            geocode,
        } => {
            let country = country.as_deref().or(default_country);
            let observation = if *geocode {
                client.current_at_geocoded(city, country).await?
            } else {
                client.current_at_place(city, country).await?
            };
            println!("{}", observation.summary());
        }

        WeatherAction::Coords { lat, lon } => {
            let observation = client.current_at_coords(*lat, *lon).await?;
            println!("{}", observation.summary());
        }

        WeatherAction::Forecast {
            city,
            country,
            periods,
        } => {
            let country = country.as_deref().or(default_country);
            let forecast = client.forecast_at_place(city, country, *periods).await?;
            println!("{}", forecast.summary());
        }

        WeatherAction::Geocode {
            query,
            limit,
            weather,
        } => {
            let matches = match client.geocode(query, *limit).await {
                Ok(matches) => matches,
                Err(BreezeError::WeatherNotFound(_)) => {
                    Output::warning(&format!("No places found for '{}'", query));
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            Output::header(&format!("Matches for '{}'", query));
            for place in &matches {
                let region = [place.state.as_deref(), place.country.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                Output::list_item(&format!(
                    "{} ({}) @ {:.4}, {:.4}",
                    place.name, region, place.lat, place.lon
                ));
                if *weather {
                    match client.current_at_coords(place.lat, place.lon).await {
                        Ok(observation) => println!("    {}", observation.summary()),
                        Err(e) => Output::warning(&format!("Could not get weather: {}", e)),
                    }
                }
            }
        }
    }

    Ok(())
}
