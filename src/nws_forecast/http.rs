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

use crate::forecast::{get_forecast, ForecastSource};
use crate::metrics::{ForecastMetrics, Outcome};
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

const OPENMETRICS_TEXT: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// State shared by every request: the forecast source and the metrics registry.
pub struct RequestContext {
    source: Arc<dyn ForecastSource>,
    registry: Registry,
    metrics: ForecastMetrics,
}

impl RequestContext {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        let mut registry = Registry::default();
        let metrics = ForecastMetrics::new(&mut registry);

        RequestContext {
            source,
            registry,
            metrics,
        }
    }
}

/// Build the router for `/forecast/{lat},{long}` and `/metrics`.
pub fn router(context: Arc<RequestContext>) -> Router {
    Router::new()
        .route("/forecast/:coordinates", get(simplified_forecast))
        .route("/metrics", get(text_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

async fn simplified_forecast(
    State(context): State<Arc<RequestContext>>,
    coordinates: Result<Path<String>, PathRejection>,
) -> Response {
    let parsed = match &coordinates {
        Ok(Path(raw)) => parse_coordinates(raw),
        Err(_) => None,
    };

    let (lat, long) = match parsed {
        Some(c) => c,
        None => {
            match coordinates {
                Ok(Path(raw)) => tracing::debug!(message = "malformed coordinates", coordinates = %raw),
                Err(e) => tracing::debug!(message = "unable to extract coordinates", error = %e),
            }
            context.metrics.request(Outcome::BadRequest);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let start = Instant::now();
    let res = get_forecast(context.source.as_ref(), lat, long).await;
    context.metrics.duration(start.elapsed());

    match res {
        Ok(f) => {
            context.metrics.request(Outcome::Success);
            tracing::debug!(message = "fetched forecast", lat = lat, long = long, description = %f.description);
            (StatusCode::OK, Json(f)).into_response()
        }
        Err(e) => {
            context.metrics.request(Outcome::Error);
            tracing::error!(message = "failed to fetch forecast", lat = lat, long = long, kind = ?e.kind(), error = %e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn text_metrics(State(context): State<Arc<RequestContext>>) -> Response {
    let mut buf = String::new();

    match encode(&mut buf, &context.registry) {
        Ok(_) => {
            tracing::debug!(message = "encoded prometheus metrics to text format", num_bytes = buf.len());
            ([(CONTENT_TYPE, OPENMETRICS_TEXT)], buf).into_response()
        }
        Err(e) => {
            tracing::error!(message = "error encoding metrics", error = %e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// Parse a `{lat},{long}` path segment, both parts finite decimal numbers.
fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (lat, long) = raw.split_once(',')?;
    let lat = lat.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let long = long.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((lat, long))
}

#[cfg(test)]
mod tests {
    use super::{parse_coordinates, router, RequestContext};
    use crate::client::{ForecastPeriod, GridForecast, GridProperties, PointMetadata, PointProperties};
    use crate::error::ForecastError;
    use crate::forecast::ForecastSource;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{Request, StatusCode};
    use reqwest::Url;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Source that serves a single period, or fails every points lookup with a 503
    struct StubSource {
        period: Option<(&'static str, i64)>,
    }

    #[async_trait]
    impl ForecastSource for StubSource {
        async fn points(&self, _lat: f64, _long: f64) -> Result<PointMetadata, ForecastError> {
            match self.period {
                Some(_) => Ok(PointMetadata {
                    id: None,
                    properties: Some(PointProperties {
                        forecast: Some("http://notempty.com".to_owned()),
                        ..Default::default()
                    }),
                }),
                None => Err(ForecastError::Unexpected(
                    reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    Url::parse("https://api.weather.gov/points/1.0000,1.0000").unwrap(),
                )),
            }
        }

        async fn forecast(&self, _point: &PointMetadata) -> Result<GridForecast, ForecastError> {
            let (short_forecast, temperature) = self.period.unwrap_or_default();
            Ok(GridForecast {
                properties: Some(GridProperties {
                    units: Some("us".to_owned()),
                    periods: vec![ForecastPeriod {
                        short_forecast: short_forecast.to_owned(),
                        temperature,
                        ..Default::default()
                    }],
                }),
            })
        }
    }

    fn context(period: Option<(&'static str, i64)>) -> Arc<RequestContext> {
        Arc::new(RequestContext::new(Arc::new(StubSource { period })))
    }

    async fn get(context: Arc<RequestContext>, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let res = router(context)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = res.status();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();

        (status, content_type, body.to_vec())
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(Some((39.7456, -97.0892)), parse_coordinates("39.7456,-97.0892"));
        assert_eq!(Some((1.0, 2.0)), parse_coordinates("1,2"));
        assert_eq!(None, parse_coordinates("abc,-97.0892"));
        assert_eq!(None, parse_coordinates("39.7456"));
        assert_eq!(None, parse_coordinates("39.7456,"));
        assert_eq!(None, parse_coordinates("NaN,1.0"));
        assert_eq!(None, parse_coordinates("1.0,inf"));
    }

    #[tokio::test]
    async fn test_forecast_success() {
        let (status, content_type, body) =
            get(context(Some(("Cloudy with a chance of meatballs", 82))), "/forecast/39.7456,-97.0892").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(Some("application/json"), content_type.as_deref());

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            serde_json::json!({
                "short_forecast": "Cloudy with a chance of meatballs",
                "description": "hot",
            }),
            json
        );
    }

    #[tokio::test]
    async fn test_forecast_malformed_latitude() {
        let (status, _, body) = get(context(Some(("Sunny", 60))), "/forecast/abc,-97.0892").await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_forecast_invalid_utf8_path() {
        let ctx = context(Some(("Sunny", 60)));
        let (status, _, body) = get(ctx.clone(), "/forecast/%FF,1").await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert!(body.is_empty());

        let (_, _, metrics) = get(ctx, "/metrics").await;
        let text = String::from_utf8(metrics).unwrap();
        assert!(text.contains("nws_forecast_requests_total{outcome=\"BadRequest\"} 1"));
    }

    #[tokio::test]
    async fn test_forecast_upstream_failure() {
        let (status, _, body) = get(context(None), "/forecast/39.7456,-97.0892").await;

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, _, _) = get(context(None), "/weather").await;
        assert_eq!(StatusCode::NOT_FOUND, status);
    }

    #[tokio::test]
    async fn test_metrics_count_outcomes() {
        let ctx = context(Some(("Sunny", 60)));
        get(ctx.clone(), "/forecast/39.7456,-97.0892").await;
        get(ctx.clone(), "/forecast/abc,-97.0892").await;

        let (status, content_type, body) = get(ctx, "/metrics").await;
        let text = String::from_utf8(body).unwrap();

        assert_eq!(StatusCode::OK, status);
        assert!(content_type.unwrap().starts_with("application/openmetrics-text"));
        assert!(text.contains("nws_forecast_requests_total{outcome=\"Success\"} 1"));
        assert!(text.contains("nws_forecast_requests_total{outcome=\"BadRequest\"} 1"));
    }
}
