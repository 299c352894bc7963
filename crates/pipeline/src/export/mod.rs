//! Export stages: the only side-effecting steps in either pipeline
//!
//! Tables go to CSV, rasters to multi-page GeoTIFF. Both write a complete
//! artifact or nothing; guardrails run before any file is created.

mod raster;
mod table;

pub use raster::{export_raster, RasterExportParams};
pub use table::export_table;
