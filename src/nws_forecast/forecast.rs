// nws_forecast - Simplified forecast service for api.weather.gov
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::client::{GridForecast, PointMetadata};
use crate::error::ForecastError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{Instrument, Level};

const COORDINATE_SCALE: f64 = 10_000.0;

/// Round a coordinate to four decimal places, halfway cases away from zero.
///
/// Values too large to scale without overflowing are returned unchanged.
pub fn normalize(value: f64) -> f64 {
    let scaled = value * COORDINATE_SCALE;
    if !scaled.is_finite() {
        return value;
    }

    scaled.round() / COORDINATE_SCALE
}

/// Source of grid point metadata and raw forecasts.
///
/// Implemented by `WeatherGovClient`. Anything else implementing it (a stub in tests,
/// for example) can be passed to `get_forecast()` in its place.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn points(&self, lat: f64, long: f64) -> Result<PointMetadata, ForecastError>;

    async fn forecast(&self, point: &PointMetadata) -> Result<GridForecast, ForecastError>;
}

/// Coarse label for a temperature in degrees Fahrenheit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Description {
    Hot,
    Moderate,
    Cold,
}

impl Description {
    pub fn from_fahrenheit(degrees: i64) -> Self {
        if degrees >= 80 {
            Self::Hot
        } else if degrees > 40 {
            Self::Moderate
        } else {
            Self::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Moderate => "moderate",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SimplifiedForecast {
    pub short_forecast: String,
    pub description: String,
}

/// Reduce a multi-period forecast to the short forecast and temperature label of the
/// first (current) period.
pub fn reduce(forecast: &GridForecast) -> Result<SimplifiedForecast, ForecastError> {
    let properties = forecast
        .properties
        .as_ref()
        .ok_or(ForecastError::InvalidInput("missing gridpoints response"))?;

    let current = properties
        .periods
        .first()
        .ok_or(ForecastError::InvalidInput("no forecast periods"))?;

    if current.short_forecast.is_empty() {
        return Err(ForecastError::InvalidInput("missing short forecast"));
    }

    // Temperatures are assumed to be Fahrenheit, the API default
    Ok(SimplifiedForecast {
        short_forecast: current.short_forecast.clone(),
        description: Description::from_fahrenheit(current.temperature).to_string(),
    })
}

/// Resolve the grid point for a location, fetch its forecast, and reduce it.
///
/// The first error from any step is returned as-is.
pub async fn get_forecast<S>(source: &S, lat: f64, long: f64) -> Result<SimplifiedForecast, ForecastError>
where
    S: ForecastSource + ?Sized,
{
    let point = source
        .points(lat, long)
        .instrument(tracing::span!(Level::DEBUG, "nws_points"))
        .await?;

    let forecast = source
        .forecast(&point)
        .instrument(tracing::span!(Level::DEBUG, "nws_gridpoints"))
        .await?;

    reduce(&forecast)
}
