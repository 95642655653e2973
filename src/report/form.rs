//! Report Form
//!
//! Holds the two datetime fields and the granularity selection, and turns
//! them into a [`TrendsRequest`] on submit.

use chrono::NaiveDateTime;

use super::error::{ReportError, ReportResult};
use super::types::{parse_datetime_local, DateRange, Granularity, TrendsRequest};

/// Class applied to the selected granularity button
pub const ACTIVE_BUTTON_CLASS: &str = "btn-report";

/// Class applied to every other granularity button
pub const INACTIVE_BUTTON_CLASS: &str = "btn-nor";

/// One granularity button as it should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GranularityButton {
    pub granularity: Granularity,
    pub label: &'static str,
    pub class: &'static str,
}

/// Form state for a single report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    granularity: Granularity,
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn set_start(&mut self, start: Option<NaiveDateTime>) {
        self.start = start;
    }

    pub fn set_end(&mut self, end: Option<NaiveDateTime>) {
        self.end = end;
    }

    /// Set the start field from its `datetime-local` input value
    ///
    /// An empty value clears the field.
    pub fn set_start_input(&mut self, value: &str) -> ReportResult<()> {
        self.start = parse_input(value)?;
        Ok(())
    }

    /// Set the end field from its `datetime-local` input value
    pub fn set_end_input(&mut self, value: &str) -> ReportResult<()> {
        self.end = parse_input(value)?;
        Ok(())
    }

    /// Select a granularity, deselecting the previous one
    pub fn select(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Styling class for the button of `granularity`
    pub fn button_class(&self, granularity: Granularity) -> &'static str {
        if self.granularity == granularity {
            ACTIVE_BUTTON_CLASS
        } else {
            INACTIVE_BUTTON_CLASS
        }
    }

    /// All four buttons with their current styling
    pub fn buttons(&self) -> [GranularityButton; 4] {
        Granularity::ALL.map(|granularity| GranularityButton {
            granularity,
            label: granularity.label(),
            class: self.button_class(granularity),
        })
    }

    /// Build the request payload
    ///
    /// Both dates are required. Their order is not checked.
    pub fn submit(&self) -> ReportResult<TrendsRequest> {
        let start = self
            .start
            .ok_or(ReportError::MissingField(TrendsRequest::START_DATE_FIELD))?;
        let end = self
            .end
            .ok_or(ReportError::MissingField(TrendsRequest::END_DATE_FIELD))?;

        Ok(TrendsRequest::new(DateRange::new(start, end), self.granularity))
    }
}

fn parse_input(value: &str) -> ReportResult<Option<NaiveDateTime>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_datetime_local(value).map(Some)
    }
}
