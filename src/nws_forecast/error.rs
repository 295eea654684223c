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

use reqwest::{StatusCode, Url};
use std::error;
use std::fmt;

/// Broad category of a `ForecastError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value handed between stages was missing or unusable.
    InvalidInput,
    /// api.weather.gov could not be reached or did not answer with a 200.
    Upstream,
    /// api.weather.gov answered with a body we could not decode.
    Decode,
}

#[derive(Debug)]
pub enum ForecastError {
    InvalidInput(&'static str),
    InvalidBaseUrl(String),
    EmptyForecastUrl,
    InvalidForecastUrl(String, url::ParseError),
    Transport(reqwest::Error, Url),
    Unexpected(StatusCode, Url),
    Decode(serde_json::Error, Url),
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidBaseUrl(_)
            | Self::EmptyForecastUrl
            | Self::InvalidForecastUrl(_, _)
            | Self::Transport(_, _)
            | Self::Unexpected(_, _) => ErrorKind::Upstream,
            Self::Decode(_, _) => ErrorKind::Decode,
        }
    }
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(s) => write!(f, "invalid input: {}", s),
            Self::InvalidBaseUrl(u) => write!(f, "invalid API URL {}", u),
            Self::EmptyForecastUrl => write!(f, "empty forecast URL"),
            Self::InvalidForecastUrl(u, e) => write!(f, "invalid forecast URL {}: {}", u, e),
            Self::Transport(e, url) => write!(f, "error {} for URL {}", e, url),
            Self::Unexpected(status, url) => write!(
                f,
                "unexpected status {} ({}) for URL {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                url
            ),
            Self::Decode(e, url) => write!(f, "unable to decode response from URL {}: {}", url, e),
        }
    }
}

impl error::Error for ForecastError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InvalidForecastUrl(_, e) => Some(e),
            Self::Transport(e, _) => Some(e),
            Self::Decode(e, _) => Some(e),
            _ => None,
        }
    }
}
