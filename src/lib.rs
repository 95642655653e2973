//! # Trend Reports
//!
//! Date-range trend reports: pick a window and a bucket size, POST them to a
//! `/get_trends` endpoint, and draw the returned counts as a line chart.
//!
//! ## Modules
//!
//! - [`report`]: form state, HTTP client, chart ownership and the page flow
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Features
//!
//! - `native` (default): HTTP client, SVG rendering, config files and the
//!   CLI. Disable it to use only the form, response and chart types, as the
//!   WASM front end does.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trend_reports::config::Config;
//! use trend_reports::report::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = TrendsClient::new(&config.client)?;
//!     let surface = SvgSurface::new("reportChart.svg", 800, 400);
//!
//!     let mut page = ReportPage::new(client, surface);
//!     page.form_mut().set_start_input("2024-01-01T00:00")?;
//!     page.form_mut().set_end_input("2024-01-08T00:00")?;
//!     page.form_mut().select(Granularity::Day);
//!
//!     let outcome = page.submit().await;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

#[cfg(feature = "native")]
pub mod config;
pub mod report;

// Re-export top-level types for convenience
pub use report::{
    ChartRenderer, ChartSpec, ChartStyle, ChartSurface, DateRange, DownloadHandler,
    DownloadOutcome, Granularity, ReportError, ReportForm, ReportResult, TrendsRequest,
    TrendsResponse, TrendsSource,
};

#[cfg(feature = "native")]
pub use report::{ReportPage, SubmitOutcome, SvgChart, SvgSurface, TrendsClient};

#[cfg(feature = "native")]
pub use config::{
    generate_default_config, ChartConfig, ClientConfig, Config, ConfigError, LoadedConfig,
    LoggingConfig,
};
