//! Download control
//!
//! The report page carries a "Download" control with no export behind it.
//! A [`DownloadHandler`] can be attached by whoever embeds the page.

use async_trait::async_trait;

use super::error::ReportResult;
use super::types::TrendsRequest;

/// What happened when the download control was pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// No handler attached; nothing happened
    Inert,
    /// A handler ran and reported where the export went
    Exported(String),
    /// The handler returned an error, which was logged
    Failed,
}

/// Export behaviour for the download control
#[async_trait]
pub trait DownloadHandler: Send + Sync {
    /// Export the report described by the last successful submission
    ///
    /// `last_request` is `None` when nothing has been rendered yet. Responses
    /// are not retained, so a handler that needs the counts fetches them again.
    async fn download(&self, last_request: Option<&TrendsRequest>) -> ReportResult<String>;
}
