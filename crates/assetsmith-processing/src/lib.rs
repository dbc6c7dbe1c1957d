//! Assetsmith Processing Library
//!
//! Image work done locally, without any network access:
//! - converting the generative backend's PNG output into the requested format
//! - drawing placeholder images for demo mode and exhausted quota
//! - rendering the summary bar chart attached to the report

pub mod chart;
pub mod convert;
pub mod placeholder;

pub use chart::render_summary_chart;
pub use convert::ImageConverter;
pub use placeholder::placeholder_image;
