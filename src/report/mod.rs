//! Trend report flow
//!
//! Form state, the `/get_trends` client and chart ownership.
//!
//! # Flow
//!
//! 1. [`ReportForm`] collects the date range and granularity and builds a
//!    [`TrendsRequest`] on submit.
//! 2. A [`TrendsSource`] (normally [`TrendsClient`]) POSTs it and decodes a
//!    validated [`TrendsResponse`].
//! 3. [`ChartRenderer`] destroys the previous chart on its [`ChartSurface`]
//!    and creates the new one.
//!
//! [`ReportPage`] runs the three steps and logs failures instead of
//! returning them.

pub mod chart;
pub mod download;
pub mod error;
pub mod form;
pub mod source;
pub mod types;

#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod page;
#[cfg(feature = "native")]
pub mod svg;

pub use chart::{
    format_count, tooltip_label, ChartRenderer, ChartSpec, ChartStyle, ChartSurface, Rgba,
};
pub use download::{DownloadHandler, DownloadOutcome};
pub use error::{ReportError, ReportResult};
pub use form::{GranularityButton, ReportForm, ACTIVE_BUTTON_CLASS, INACTIVE_BUTTON_CLASS};
pub use source::TrendsSource;
pub use types::{
    format_datetime_local, parse_datetime_local, DateRange, Granularity, TrendsRequest,
    TrendsResponse, DATETIME_LOCAL_FORMAT,
};

#[cfg(feature = "native")]
pub use client::TrendsClient;
#[cfg(feature = "native")]
pub use page::{ReportPage, SubmitOutcome};
#[cfg(feature = "native")]
pub use svg::{SvgChart, SvgSurface};
