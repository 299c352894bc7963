//! Temporal aggregation of single-band images into one multi-band image
//!
//! Band `i` of the output corresponds to sequence position `i` of the input;
//! this ordering is the only load-bearing one in the stack pipeline.

use terraseries_core::{Error, Image, Result};

/// Merge an ordered sequence of single-band images into one multi-band
/// image.
///
/// Band names embed the source acquisition month for traceability, e.g.
/// `2000-01_NDVI`. All inputs must share dimensions and georeferencing.
/// An empty sequence yields a valid zero-band image.
pub fn to_bands(images: &[Image]) -> Result<Image> {
    let Some(first) = images.first() else {
        return Ok(Image::empty(chrono::NaiveDate::default()));
    };

    let Some((_, reference)) = first.bands().first() else {
        return Err(Error::Other("cannot stack images with no bands".to_string()));
    };
    let (er, ec) = reference.shape();
    let reference_transform = *reference.transform();

    let mut bands = Vec::new();
    for image in images {
        for (name, raster) in image.bands() {
            let (ar, ac) = raster.shape();
            if (ar, ac) != (er, ec) {
                return Err(Error::SizeMismatch { er, ec, ar, ac });
            }
            if *raster.transform() != reference_transform {
                return Err(Error::InvalidParameter {
                    name: "images",
                    value: image.month_key(),
                    reason: "stacked images must share georeferencing".to_string(),
                });
            }
            bands.push((format!("{}_{}", image.month_key(), name), raster.clone()));
        }
    }

    Image::new(first.date(), bands)
}
