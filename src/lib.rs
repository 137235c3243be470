//! Core entry point for the rapor crate.
//!
//! The crate renders the academic report ("rapor") of one student from a
//! snapshot of school records and exports it:
//!
//! * [`report::render_report`] builds the structured document,
//! * [`surface::ReportSurface`] holds the rendered report and its layout style,
//! * [`export`] turns a surface into a paginated raster PDF, a print window or
//!   a direct print, talking to the outside world through [`host::Host`].

pub mod export;
pub mod fonts;
pub mod host;
pub mod html;
pub mod model;
pub mod paginate;
pub mod raster;
pub mod report;
pub mod selection;
pub mod surface;
