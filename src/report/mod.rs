//! Presentation of analysis results: plotly trace and HTML pages.

pub mod html;
pub mod plot;
