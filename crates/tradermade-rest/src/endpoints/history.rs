//! Historical and time-series endpoints

use super::execute;
use crate::error::{RestError, RestResult};
use crate::types::{Historical, HistoricalData, HistoricalRate, TimeSeriesRate};
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};
use tradermade_types::ApiKey;

/// Periods accepted with the hourly interval
pub const HOURLY_PERIODS: [u32; 6] = [1, 2, 4, 6, 8, 24];

/// Periods accepted with the minute interval
pub const MINUTE_PERIODS: [u32; 5] = [1, 5, 10, 15, 30];

/// Granularity of a single historical lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoricalInterval {
    /// `minute_historical`, keyed by `date_time` (`YYYY-MM-DD-HH:MM`)
    Minute,
    /// `hour_historical`, keyed by `date_time` (`YYYY-MM-DD-HH:00`)
    Hour,
    /// `historical`, keyed by `date` (`YYYY-MM-DD`)
    Day,
}

impl FromStr for HistoricalInterval {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            other => Err(RestError::InvalidParameter(format!("invalid interval: {}", other))),
        }
    }
}

/// Interval and period of a time-series request
///
/// Construction validates the period, so an invalid combination never
/// reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSeriesInterval {
    /// One bar per day
    Daily,
    /// Bars of 1, 2, 4, 6, 8 or 24 hours
    Hourly(u32),
    /// Bars of 1, 5, 10, 15 or 30 minutes
    Minute(u32),
}

impl TimeSeriesInterval {
    /// Hourly bars of `period` hours
    pub fn hourly(period: u32) -> RestResult<Self> {
        if HOURLY_PERIODS.contains(&period) {
            Ok(Self::Hourly(period))
        } else {
            Err(RestError::InvalidParameter(format!(
                "invalid period for hourly interval: {}",
                period
            )))
        }
    }

    /// Minute bars of `period` minutes
    pub fn minute(period: u32) -> RestResult<Self> {
        if MINUTE_PERIODS.contains(&period) {
            Ok(Self::Minute(period))
        } else {
            Err(RestError::InvalidParameter(format!(
                "invalid period for minute interval: {}",
                period
            )))
        }
    }

    /// Parse an interval name (case-insensitive) with an optional period
    ///
    /// `daily` ignores the period; `hourly` and `minute` require one.
    pub fn parse(interval: &str, period: Option<u32>) -> RestResult<Self> {
        match interval.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            name @ ("hourly" | "minute") => {
                let period = period.ok_or_else(|| {
                    RestError::InvalidParameter(format!(
                        "period must be provided for {} interval",
                        interval
                    ))
                })?;
                if name == "hourly" {
                    Self::hourly(period)
                } else {
                    Self::minute(period)
                }
            }
            _ => Err(RestError::InvalidParameter(format!("invalid interval: {}", interval))),
        }
    }

    /// Interval name as sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Hourly(_) => "hourly",
            Self::Minute(_) => "minute",
        }
    }

    /// Period, if the interval takes one
    pub fn period(&self) -> Option<u32> {
        match self {
            Self::Daily => None,
            Self::Hourly(p) | Self::Minute(p) => Some(*p),
        }
    }
}

impl fmt::Display for TimeSeriesInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period() {
            Some(period) => write!(f, "{}:{}", self.name(), period),
            None => f.write_str(self.name()),
        }
    }
}

/// Historical and time-series endpoints
pub struct HistoryEndpoints<'a> {
    client: &'a Client,
    base_url: &'a str,
    api_key: &'a ApiKey,
}

impl<'a> HistoryEndpoints<'a> {
    pub fn new(client: &'a Client, base_url: &'a str, api_key: &'a ApiKey) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Get a single minute bar
    #[instrument(skip(self))]
    pub async fn minute_historical(&self, currency: &str, date_time: &str) -> RestResult<HistoricalData> {
        debug!("Fetching minute bar for {}", currency);
        execute(self.historical_request(HistoricalInterval::Minute, currency, date_time)).await
    }

    /// Get a single hour bar
    #[instrument(skip(self))]
    pub async fn hour_historical(&self, currency: &str, date_time: &str) -> RestResult<HistoricalData> {
        debug!("Fetching hour bar for {}", currency);
        execute(self.historical_request(HistoricalInterval::Hour, currency, date_time)).await
    }

    /// Get daily bars for one or more currency pairs
    ///
    /// # Arguments
    /// * `currency` - Comma-separated pairs (e.g., "EURUSD,GBPUSD")
    /// * `date` - Day in `YYYY-MM-DD` form
    #[instrument(skip(self))]
    pub async fn daily_historical(&self, currency: &str, date: &str) -> RestResult<HistoricalRate> {
        debug!("Fetching daily bars for {}", currency);
        execute(self.historical_request(HistoricalInterval::Day, currency, date)).await
    }

    /// Get historical data, choosing the endpoint by interval name
    ///
    /// `interval` must be `minute`, `hour` or `day`.
    #[instrument(skip(self))]
    pub async fn historical(&self, currency: &str, date_time: &str, interval: &str) -> RestResult<Historical> {
        match interval.parse::<HistoricalInterval>()? {
            HistoricalInterval::Minute => self
                .minute_historical(currency, date_time)
                .await
                .map(Historical::Minute),
            HistoricalInterval::Hour => self
                .hour_historical(currency, date_time)
                .await
                .map(Historical::Hour),
            HistoricalInterval::Day => self
                .daily_historical(currency, date_time)
                .await
                .map(Historical::Day),
        }
    }

    /// Get a time series between two dates
    #[instrument(skip(self))]
    pub async fn timeseries(
        &self,
        currency: &str,
        start_date: &str,
        end_date: &str,
        interval: TimeSeriesInterval,
    ) -> RestResult<TimeSeriesRate> {
        debug!("Fetching {} time series for {}", interval, currency);
        execute(self.timeseries_request(currency, start_date, end_date, interval)).await
    }

    pub(crate) fn historical_request(
        &self,
        interval: HistoricalInterval,
        currency: &str,
        date_time: &str,
    ) -> RequestBuilder {
        let (path, date_key) = match interval {
            HistoricalInterval::Minute => ("minute_historical", "date_time"),
            HistoricalInterval::Hour => ("hour_historical", "date_time"),
            HistoricalInterval::Day => ("historical", "date"),
        };
        let url = format!("{}/{}", self.base_url, path);
        self.client.get(url).query(&[
            ("currency", currency),
            (date_key, date_time),
            ("api_key", self.api_key.expose()),
        ])
    }

    pub(crate) fn timeseries_request(
        &self,
        currency: &str,
        start_date: &str,
        end_date: &str,
        interval: TimeSeriesInterval,
    ) -> RequestBuilder {
        let url = format!("{}/timeseries", self.base_url);
        let mut request = self.client.get(url).query(&[
            ("currency", currency),
            ("start_date", start_date),
            ("end_date", end_date),
            ("format", "records"),
            ("interval", interval.name()),
        ]);
        if let Some(period) = interval.period() {
            request = request.query(&[("period", period)]);
        }
        request.query(&[("api_key", self.api_key.expose())])
    }
}
