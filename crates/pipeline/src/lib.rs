//! # Terraseries Pipeline
//!
//! Two linear extraction pipelines over dated raster collections:
//!
//! - **Time series**: sample a rescaled band at station points per image and
//!   export one CSV row per (station, month).
//! - **Clipped stack**: clip a rescaled band to an administrative boundary
//!   per image, stack the results into one multi-band raster, and export a
//!   GeoTIFF.
//!
//! Every stage is a pure per-image transform; the drivers own sequencing and
//! parallelism, and the exporters are the only side-effecting steps.

pub mod clip;
pub mod config;
pub mod export;
pub mod reduce;
pub mod stack;
pub mod stack_export;
pub mod timeseries;
pub mod transform;

pub use clip::clip;
pub use config::{ExtractionConfig, StackExportConfig, Weighting};
pub use export::{export_raster, export_table, RasterExportParams};
pub use reduce::{reduce_regions, ReduceParams, Reducer};
pub use stack::to_bands;
pub use stack_export::export_clipped_stack;
pub use timeseries::extract_time_series;
pub use transform::{hours_in_month, rescale, unmask};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clip::clip;
    pub use crate::config::{ExtractionConfig, StackExportConfig, Weighting};
    pub use crate::export::{export_raster, export_table, RasterExportParams};
    pub use crate::reduce::{reduce_regions, ReduceParams, Reducer};
    pub use crate::stack::to_bands;
    pub use crate::stack_export::export_clipped_stack;
    pub use crate::timeseries::extract_time_series;
    pub use crate::transform::{hours_in_month, rescale, unmask};
    pub use terraseries_core::prelude::*;
}
