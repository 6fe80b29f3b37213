//! Forecast aggregator: open entries rolled up by currency.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::ForecastService;
pub use types::{Forecast, ForecastBucket};
