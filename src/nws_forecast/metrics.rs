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

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Success,
    BadRequest,
    Error,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OutcomeLabels {
    outcome: Outcome,
}

/// Holder for metrics about forecast requests served.
///
/// All metrics are created and registered upon call to `ForecastMetrics::new()`. Metrics
/// all share the prefix "nws_forecast_".
#[derive(Debug, Clone)]
pub struct ForecastMetrics {
    requests: Family<OutcomeLabels, Counter>,
    duration: Histogram,
}

impl ForecastMetrics {
    /// Create a new `ForecastMetrics` and register each metric with the provided `Registry`.
    pub fn new(reg: &mut Registry) -> Self {
        let requests = Family::<OutcomeLabels, Counter>::default();
        let duration = Histogram::new(exponential_buckets(0.05, 2.0, 8));

        reg.register(
            "nws_forecast_requests",
            "Forecast requests by outcome",
            requests.clone(),
        );
        reg.register(
            "nws_forecast_duration_seconds",
            "Time spent fetching forecasts from api.weather.gov",
            duration.clone(),
        );

        Self { requests, duration }
    }

    pub fn request(&self, outcome: Outcome) {
        self.requests.get_or_create(&OutcomeLabels { outcome }).inc();
    }

    pub fn duration(&self, elapsed: Duration) {
        self.duration.observe(elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::{ForecastMetrics, Outcome};
    use prometheus_client::encoding::text::encode;
    use prometheus_client::registry::Registry;
    use std::time::Duration;

    #[test]
    fn test_request_outcomes_encoded() {
        let mut registry = Registry::default();
        let metrics = ForecastMetrics::new(&mut registry);

        metrics.request(Outcome::Success);
        metrics.request(Outcome::Success);
        metrics.request(Outcome::BadRequest);
        metrics.duration(Duration::from_millis(120));

        let mut buf = String::new();
        encode(&mut buf, &registry).unwrap();

        assert!(buf.contains("nws_forecast_requests_total{outcome=\"Success\"} 2"));
        assert!(buf.contains("nws_forecast_requests_total{outcome=\"BadRequest\"} 1"));
        assert!(buf.contains("nws_forecast_duration_seconds_count 1"));
    }
}
