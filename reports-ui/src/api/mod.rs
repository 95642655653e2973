//! API Client
//!
//! HTTP access to the trends endpoint.

pub mod client;

pub use client::*;
