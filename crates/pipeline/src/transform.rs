//! Per-pixel band transforms
//!
//! Affine rescaling from stored integer encodings to physical units, and
//! unmasking of missing samples with a fill sentinel. All transforms are
//! independent per pixel; no spatial context is used.

use chrono::{Datelike, Months, NaiveDate};
use ndarray::Array2;
use rayon::prelude::*;
use terraseries_core::raster::Raster;
use terraseries_core::{Error, Result};

/// Apply `out = in * scale + offset` to every valid cell.
///
/// Nodata cells (NaN or the raster's nodata marker) are preserved as NaN.
///
/// Typical parameterizations: MODIS vegetation indices use
/// `scale = 0.0001, offset = 0`; land surface temperature uses
/// `scale = 0.02, offset = -273.15` for Kelvin to Celsius.
pub fn rescale(raster: &Raster<f64>, scale: f64, offset: f64) -> Result<Raster<f64>> {
    let (rows, cols) = raster.shape();
    let nodata = raster.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let val = raster.data()[(row, col)];
                if val.is_nan() {
                    continue;
                }
                if let Some(nd) = nodata {
                    if (val - nd).abs() < f64::EPSILON {
                        continue;
                    }
                }
                row_data[col] = val * scale + offset;
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

/// Replace missing samples with a fill sentinel.
///
/// After unmasking, the output has no nodata marker: filled cells are
/// ordinary values and participate in downstream aggregation, so partially
/// missing footprints are never silently dropped.
pub fn unmask(raster: &Raster<f64>, fill: f64) -> Raster<f64> {
    let (rows, cols) = raster.shape();

    let mut output = raster.clone();
    for row in 0..rows {
        for col in 0..cols {
            let val = output.data()[(row, col)];
            if raster.is_nodata(val) {
                output.data_mut()[(row, col)] = fill;
            }
        }
    }
    output.set_nodata(None);
    output
}

/// Hours in the calendar month containing `date`.
///
/// Weight factor for the opt-in per-pixel time weighting
/// (`value * days_in_month * 24`).
pub fn hours_in_month(date: NaiveDate) -> f64 {
    let first = date.with_day(1).unwrap_or(date);
    let next = first + Months::new(1);
    ((next - first).num_days() * 24) as f64
}
