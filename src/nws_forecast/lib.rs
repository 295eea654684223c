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

//! Simplified forecast service for api.weather.gov
//!
//! ## Features
//!
//! `nws_forecast` serves a one-line forecast for any latitude and longitude covered by the
//! [api.weather.gov] API. For each request it looks up the [NWS grid point] containing the
//! location, fetches the forecast for that grid point, and reduces the current period to two
//! fields.
//!
//! * `short_forecast` - Short text summary of the current period, e.g. "Partly Cloudy".
//! * `description` - `hot` (80°F and above), `moderate` (41°F to 79°F), or `cold` (40°F and below).
//!
//! [NWS grid point]: https://www.weather.gov/documentation/services-web-api#/default/point
//! [api.weather.gov]: https://www.weather.gov/documentation/services-web-api
//!
//! ## Build
//!
//! `nws_forecast` is a Rust program and must be built from source using a [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! git clone git@github.com:56quarters/nws_forecast.git && cd nws_forecast
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! Start the server. By default it listens on `127.0.0.1:8080`.
//!
//! ```text
//! ./nws_forecast --bind 127.0.0.1:8080
//! ```
//!
//! Then request a forecast for a location.
//!
//! ```text
//! curl -sS 'http://localhost:8080/forecast/39.7456,-97.0892'
//! {"short_forecast":"Partly Cloudy","description":"moderate"}
//! ```
//!
//! Coordinates are rounded to four decimal places before being sent to the API. Malformed
//! coordinates result in a `400` response and any failure talking to the API results in a
//! `500` response, both with an empty body. Details of failures are only logged.
//!
//! ### Prometheus
//!
//! Counts of requests by outcome and the time spent fetching forecasts are exposed at
//! `/metrics` on the same port.
//!

pub mod client;
pub mod error;
pub mod forecast;
pub mod http;
pub mod metrics;
