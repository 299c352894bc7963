//! Per-image clipping to a boundary polygon
//!
//! Pure mask: pixels whose centers fall outside the boundary become nodata,
//! interior values are untouched, and the grid, georeferencing, and
//! acquisition date all carry over.

use geo::{BoundingRect, Contains};
use geo_types::{Geometry, Point};
use ndarray::Array2;
use rayon::prelude::*;
use terraseries_core::raster::Raster;
use terraseries_core::{Error, Image, Result};

/// Clip every band of an image to a polygonal boundary.
///
/// The output keeps the input's extent; clipping never resamples.
pub fn clip(image: &Image, boundary: &Geometry<f64>) -> Result<Image> {
    require_polygonal(boundary)?;

    let bands = image
        .bands()
        .iter()
        .map(|(name, raster)| Ok((name.clone(), mask_raster(raster, boundary)?)))
        .collect::<Result<Vec<_>>>()?;

    Image::new(image.date(), bands)
}

/// Bounding rectangle of a boundary geometry as (min_x, min_y, max_x, max_y).
///
/// This is the export region for the clipped-stack pipeline.
pub fn boundary_bounds(boundary: &Geometry<f64>) -> Result<(f64, f64, f64, f64)> {
    let rect = boundary
        .bounding_rect()
        .ok_or_else(|| Error::Other("boundary geometry has no extent".to_string()))?;
    Ok((rect.min().x, rect.min().y, rect.max().x, rect.max().y))
}

fn require_polygonal(boundary: &Geometry<f64>) -> Result<()> {
    match boundary {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Ok(()),
        _ => Err(Error::InvalidParameter {
            name: "boundary",
            value: "non-polygonal geometry".to_string(),
            reason: "clipping requires a polygon or multipolygon".to_string(),
        }),
    }
}

fn mask_raster(raster: &Raster<f64>, boundary: &Geometry<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = raster.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let (x, y) = raster.pixel_to_geo(col, row);
                if contains_point(boundary, x, y) {
                    row_data[col] = raster.data()[(row, col)];
                }
            }
            row_data
        })
        .collect();

    let mut output = raster.with_same_meta(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

fn contains_point(boundary: &Geometry<f64>, x: f64, y: f64) -> bool {
    let point = Point::new(x, y);
    match boundary {
        Geometry::Polygon(poly) => poly.contains(&point),
        Geometry::MultiPolygon(mp) => mp.contains(&point),
        _ => false,
    }
}
