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

use crate::error::ForecastError;
use crate::forecast::{normalize, ForecastSource};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Client for the `/points` and gridpoint forecast endpoints of api.weather.gov.
///
/// The underlying `reqwest::Client` is supplied by the caller along with any timeout
/// it should enforce. It is safe to share a single `WeatherGovClient` between requests.
#[derive(Debug)]
pub struct WeatherGovClient {
    client: Client,
    base_url: Url,
}

impl WeatherGovClient {
    const USER_AGENT: &'static str = "NWS Forecast Service (https://github.com/56quarters/nws_forecast)";
    const JSON_RESPONSE: &'static str = "application/geo+json";

    pub fn new(client: Client, base_url: &str) -> Result<Self, ForecastError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| ForecastError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(WeatherGovClient { client, base_url })
    }

    /// Resolve a latitude and longitude to the grid point metadata that contains them.
    ///
    /// Both coordinates are rounded to four decimal places first since the API answers
    /// finer precision with a redirect.
    pub async fn points(&self, lat: f64, long: f64) -> Result<PointMetadata, ForecastError> {
        let points_url = self.points_url(normalize(lat), normalize(long));
        tracing::debug!(message = "making points request", url = %points_url);

        self.make_request(points_url).await
    }

    /// Fetch the multi-period forecast referenced by grid point metadata.
    pub async fn forecast(&self, point: &PointMetadata) -> Result<GridForecast, ForecastError> {
        let forecast_url = point.forecast_url()?;
        tracing::debug!(message = "making gridpoint forecast request", url = %forecast_url);

        self.make_request(forecast_url).await
    }

    async fn make_request<T: DeserializeOwned>(&self, url: Url) -> Result<T, ForecastError> {
        let res = self
            .client
            .get(url.clone())
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .send()
            .await
            .map_err(|e| ForecastError::Transport(e, url.clone()))?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(ForecastError::Unexpected(status, url));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| ForecastError::Transport(e, url.clone()))?;

        serde_json::from_slice(&body).map_err(|e| ForecastError::Decode(e, url))
    }

    fn points_url(&self, lat: f64, long: f64) -> Url {
        let mut url = self.base_url.clone();
        // Base URL is checked to support path segments in `new()`
        if let Ok(mut p) = url.path_segments_mut() {
            p.pop_if_empty().push("points").push(&format!("{:.4},{:.4}", lat, long));
        }

        url
    }
}

#[async_trait]
impl ForecastSource for WeatherGovClient {
    async fn points(&self, lat: f64, long: f64) -> Result<PointMetadata, ForecastError> {
        WeatherGovClient::points(self, lat, long).await
    }

    async fn forecast(&self, point: &PointMetadata) -> Result<GridForecast, ForecastError> {
        WeatherGovClient::forecast(self, point).await
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PointMetadata {
    #[serde(alias = "id")]
    pub id: Option<String>,
    #[serde(alias = "properties")]
    pub properties: Option<PointProperties>,
}

impl PointMetadata {
    /// Parsed URL of the forecast for this grid point.
    ///
    /// Fails if the point has no properties at all, or if the forecast URL is missing
    /// or blank. Both are checked before any request is made.
    pub fn forecast_url(&self) -> Result<Url, ForecastError> {
        let properties = self
            .properties
            .as_ref()
            .ok_or(ForecastError::InvalidInput("missing points response"))?;

        let raw = properties
            .forecast
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ForecastError::EmptyForecastUrl)?;

        Url::parse(raw).map_err(|e| ForecastError::InvalidForecastUrl(raw.to_owned(), e))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PointProperties {
    #[serde(alias = "@id")]
    pub id: Option<String>,
    #[serde(alias = "gridId")]
    pub grid_id: Option<String>,
    #[serde(alias = "gridX")]
    pub grid_x: Option<i64>,
    #[serde(alias = "gridY")]
    pub grid_y: Option<i64>,
    #[serde(alias = "forecast")]
    pub forecast: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GridForecast {
    #[serde(alias = "properties")]
    pub properties: Option<GridProperties>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GridProperties {
    #[serde(alias = "units")]
    pub units: Option<String>,
    #[serde(alias = "periods", default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ForecastPeriod {
    #[serde(alias = "number")]
    pub number: i64,
    #[serde(alias = "name")]
    pub name: String,
    #[serde(alias = "startTime")]
    pub start_time: String,
    #[serde(alias = "endTime")]
    pub end_time: String,
    #[serde(alias = "temperature")]
    pub temperature: i64,
    #[serde(alias = "temperatureUnit")]
    pub temperature_unit: String,
    #[serde(alias = "shortForecast")]
    pub short_forecast: String,
    #[serde(alias = "detailedForecast")]
    pub detailed_forecast: String,
}
