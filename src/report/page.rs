//! Report Page
//!
//! Wires the form, a trends source and the chart renderer into the
//! submit → request → response → redraw flow. Failures are logged and
//! dropped: the caller never sees an error and the last good chart stays up.

use uuid::Uuid;

use super::chart::{ChartRenderer, ChartSpec, ChartSurface};
use super::download::{DownloadHandler, DownloadOutcome};
use super::form::ReportForm;
use super::source::TrendsSource;
use super::types::{format_datetime_local, TrendsRequest};

/// Result of one submission, for callers that want to report it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new chart replaced the previous one
    Rendered { points: usize },
    /// Required fields were missing; nothing was sent
    Incomplete,
    /// The request or decode failed; the previous chart is untouched
    FetchFailed,
    /// The surface could not draw the new chart
    RenderFailed,
}

impl SubmitOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// The report page: form state, data source and the owned chart
pub struct ReportPage<T: TrendsSource, S: ChartSurface> {
    form: ReportForm,
    source: T,
    renderer: ChartRenderer<S>,
    download_handler: Option<Box<dyn DownloadHandler>>,
    last_request: Option<TrendsRequest>,
}

impl<T: TrendsSource, S: ChartSurface> ReportPage<T, S> {
    pub fn new(source: T, surface: S) -> Self {
        Self {
            form: ReportForm::new(),
            source,
            renderer: ChartRenderer::new(surface),
            download_handler: None,
            last_request: None,
        }
    }

    /// Attach export behaviour to the download control
    pub fn with_download_handler(mut self, handler: Box<dyn DownloadHandler>) -> Self {
        self.download_handler = Some(handler);
        self
    }

    pub fn form(&self) -> &ReportForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ReportForm {
        &mut self.form
    }

    pub fn renderer(&self) -> &ChartRenderer<S> {
        &self.renderer
    }

    pub fn has_chart(&self) -> bool {
        self.renderer.has_chart()
    }

    /// Request of the last submission that produced a chart
    pub fn last_request(&self) -> Option<&TrendsRequest> {
        self.last_request.as_ref()
    }

    /// Submit the form and redraw the chart with the response
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request_id = Uuid::new_v4();

        let request = match self.form.submit() {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(request_id = %request_id, "Report not submitted: {}", e);
                return SubmitOutcome::Incomplete;
            }
        };

        tracing::info!(
            request_id = %request_id,
            start_date = %format_datetime_local(&request.range.start),
            end_date = %format_datetime_local(&request.range.end),
            data_type = %request.granularity,
            "Submitting report"
        );

        if request.range.is_inverted() {
            tracing::debug!(request_id = %request_id, "Start date is after end date");
        }

        let trends = match self.source.fetch_trends(&request).await {
            Ok(trends) => trends,
            Err(e) => {
                tracing::error!(request_id = %request_id, "Error fetching trends: {}", e);
                return SubmitOutcome::FetchFailed;
            }
        };

        let points = trends.len();
        match self.renderer.render_spec(&ChartSpec::from(trends)) {
            Ok(_) => {
                tracing::info!(request_id = %request_id, points, "Report rendered");
                self.last_request = Some(request);
                SubmitOutcome::Rendered { points }
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, "Error rendering chart: {}", e);
                SubmitOutcome::RenderFailed
            }
        }
    }

    /// Press the download control
    pub async fn download(&self) -> DownloadOutcome {
        let Some(handler) = &self.download_handler else {
            tracing::debug!("Download pressed with no handler attached");
            return DownloadOutcome::Inert;
        };

        match handler.download(self.last_request.as_ref()).await {
            Ok(location) => {
                tracing::info!("Report exported to {}", location);
                DownloadOutcome::Exported(location)
            }
            Err(e) => {
                tracing::error!("Download failed: {}", e);
                DownloadOutcome::Failed
            }
        }
    }

    /// Tear the page down, destroying the chart
    pub fn close(&mut self) {
        self.renderer.teardown();
    }

    /// Leave the page but keep the chart on its surface
    pub fn detach_chart(&mut self) -> Option<S::Handle> {
        self.renderer.detach()
    }
}
