//! Clipped-stack pipeline
//!
//! Load, filter, rescale, clip to an administrative boundary, stack the
//! per-month bands, export one multi-band GeoTIFF over the boundary's
//! bounding region.

use crate::clip::{boundary_bounds, clip};
use crate::config::StackExportConfig;
use crate::export::{export_raster, RasterExportParams};
use crate::stack::to_bands;
use crate::transform::rescale;
use geo_types::Geometry;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use terraseries_core::{Catalog, Error, FeatureCollection, Image, Result, CRS};
use tracing::{info, warn};

/// Run the clipped-stack export end to end and write
/// `{sink}/{description}.tif`.
///
/// Band order in the output matches the chronological order of the filtered
/// collection. The pixel budget is enforced before anything is written; any
/// stage error aborts the run with no artifact.
pub fn export_clipped_stack(
    catalog: &dyn Catalog,
    config: &StackExportConfig,
    sink: &Path,
) -> Result<PathBuf> {
    info!(
        dataset = %config.dataset_id,
        boundary = %config.boundary_id,
        band = %config.band,
        "loading collections"
    );
    let collection = catalog.image_collection(&config.dataset_id)?;
    let boundary_fc = catalog.feature_collection(&config.boundary_id)?;
    let boundary = boundary_geometry(&config.boundary_id, &boundary_fc)?;

    let filtered = collection
        .filter_date(config.start_date, config.end_date)
        .select(&config.band)?;
    if filtered.is_empty() {
        warn!(
            start = %config.start_date,
            end = %config.end_date,
            "no images in range; exporting a zero-band raster"
        );
    }
    info!(images = filtered.len(), "clipping per image");

    let clipped: Vec<Image> = filtered
        .images()
        .par_iter()
        .map(|image| {
            let band = image.band(&config.band)?;
            let scaled = rescale(band, config.scale, config.offset)?;
            clip(
                &Image::single_band(image.date(), config.band.as_str(), scaled),
                &boundary,
            )
        })
        .collect::<Result<_>>()?;

    let stacked = to_bands(&clipped)?;

    let params = RasterExportParams {
        crs: CRS::parse(&config.crs)?,
        resolution: config.ground_sample_distance,
        region: boundary_bounds(&boundary)?,
        max_pixels: config.max_pixels,
    };
    let path = export_raster(&stacked, sink, &config.description(), &params)?;
    info!(
        bands = stacked.band_count(),
        path = %path.display(),
        "raster export complete"
    );
    Ok(path)
}

/// First polygonal geometry in the boundary collection.
fn boundary_geometry(id: &str, fc: &FeatureCollection) -> Result<Geometry<f64>> {
    fc.iter()
        .filter_map(|f| f.geometry.as_ref())
        .find(|g| matches!(g, Geometry::Polygon(_) | Geometry::MultiPolygon(_)))
        .cloned()
        .ok_or_else(|| Error::InvalidParameter {
            name: "boundary_id",
            value: id.to_string(),
            reason: "feature collection contains no polygonal geometry".to_string(),
        })
}
