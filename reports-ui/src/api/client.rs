//! HTTP API Client
//!
//! Posts the report form to `/get_trends` as multipart form data.

use gloo_net::http::Request;
use trend_reports::{TrendsRequest, TrendsResponse};
use web_sys::FormData;

/// Path of the trends endpoint, relative to the API base
pub const TRENDS_PATH: &str = "/get_trends";

/// Local storage key overriding the API base
const API_BASE_KEY: &str = "trend_reports_api_url";

/// Get the API base URL from local storage, or the page origin if unset
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_BASE_KEY).ok().flatten())
        .unwrap_or_default();
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// Full URL of the trends endpoint for a given base
pub fn trends_url(api_base: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), TRENDS_PATH)
}

/// Build the body the form submits: exactly the three report fields
fn form_data(request: &TrendsRequest) -> Result<FormData, String> {
    let data = FormData::new().map_err(|e| format!("FormData error: {:?}", e))?;
    for (name, value) in request.fields() {
        data.append_with_str(name, &value)
            .map_err(|e| format!("FormData error: {:?}", e))?;
    }
    Ok(data)
}

/// Fetch trends for a submitted form
pub async fn fetch_trends(request: &TrendsRequest) -> Result<TrendsResponse, String> {
    let url = trends_url(&get_api_base());

    let response = Request::post(&url)
        .body(form_data(request)?)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    let body = response
        .text()
        .await
        .map_err(|e| format!("Read error: {}", e))?;

    if !response.ok() {
        return Err(format!("Server returned {}: {}", response.status(), body));
    }

    TrendsResponse::from_json(&body).map_err(|e| e.to_string())
}
