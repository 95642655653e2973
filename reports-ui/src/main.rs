//! Trend Reports Page
//!
//! Browser front end for the trends endpoint, built with Leptos (WASM).
//!
//! # Architecture
//!
//! A client-side rendered (CSR) Leptos application. The form posts
//! `start_date`, `end_date` and `data_type` to `/get_trends` and draws the
//! returned counts on the `reportChart` canvas. Form state, response
//! validation and chart ownership come from the `trend-reports` crate.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
