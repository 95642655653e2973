//! Pages

pub mod reports;

pub use reports::Reports;
