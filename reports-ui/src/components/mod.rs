//! UI Components

pub mod chart;

pub use chart::CanvasSurface;
