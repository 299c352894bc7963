//! Multi-band GeoTIFF export
//!
//! Native writer in the Gray32Float, one-page-per-band layout. The pixel
//! budget is enforced before any file is created, so an oversized request
//! leaves no partial artifact behind.

use std::fs::File;
use std::path::{Path, PathBuf};
use terraseries_core::raster::Raster;
use terraseries_core::{Error, Image, Result, CRS};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

// GeoTIFF tag ids
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;

/// Parameters for raster export
#[derive(Debug, Clone)]
pub struct RasterExportParams {
    /// Target CRS; must match the image's CRS (no reprojection)
    pub crs: CRS,
    /// Output cell size in georeferenced units
    pub resolution: f64,
    /// Output region as (min_x, min_y, max_x, max_y)
    pub region: (f64, f64, f64, f64),
    /// Maximum number of pixels (cols x rows x bands) allowed
    pub max_pixels: u64,
}

/// Export a multi-band image to `{sink}/{description}.tif`.
///
/// Each band is resampled onto the requested region and resolution by
/// nearest-neighbor grid sampling and written as one Gray32Float page. Band
/// page order matches the image's band order.
pub fn export_raster(
    image: &Image,
    sink: &Path,
    description: &str,
    params: &RasterExportParams,
) -> Result<PathBuf> {
    if params.resolution <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "resolution",
            value: params.resolution.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let (min_x, min_y, max_x, max_y) = params.region;
    if max_x < min_x || max_y < min_y {
        return Err(Error::InvalidParameter {
            name: "region",
            value: format!("({min_x}, {min_y}, {max_x}, {max_y})"),
            reason: "region maximum must not precede its minimum".to_string(),
        });
    }

    let cols = ((max_x - min_x) / params.resolution).ceil() as u64;
    let rows = ((max_y - min_y) / params.resolution).ceil() as u64;

    // Pixel budget guardrail, checked before anything touches the sink.
    // Degenerate region/resolution pairs can overflow u64; an overflowing
    // count exceeds every ceiling.
    let required = cols
        .checked_mul(rows)
        .and_then(|p| p.checked_mul(image.band_count() as u64))
        .unwrap_or(u64::MAX);
    if required > params.max_pixels {
        return Err(Error::ExportTooLarge {
            required,
            ceiling: params.max_pixels,
        });
    }

    if let Some(image_crs) = image.crs() {
        if !image_crs.is_equivalent(&params.crs) {
            return Err(Error::CrsMismatch(
                image_crs.identifier(),
                params.crs.identifier(),
            ));
        }
    }

    let path = sink.join(format!("{}.tif", description));
    let file = File::create(&path)?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    for (_, band) in image.bands() {
        let data = resample_band(band, params, rows as usize, cols as usize);

        let mut page = encoder
            .new_image::<Gray32Float>(cols as u32, rows as u32)
            .map_err(|e| Error::Other(format!("Cannot create TIFF page: {}", e)))?;

        // ModelPixelScaleTag
        let scale = [params.resolution, params.resolution, 0.0];
        page.encoder()
            .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])
            .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

        // ModelTiepointTag: raster (0,0) pins to the region's north-west corner
        let tiepoint = [0.0, 0.0, 0.0, min_x, max_y, 0.0];
        page.encoder()
            .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])
            .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

        let geokeys = geo_key_directory(&params.crs);
        page.encoder()
            .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys.as_slice())
            .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

        page.write_data(&data)
            .map_err(|e| Error::Other(format!("Cannot write band data: {}", e)))?;
    }

    Ok(path)
}

/// Nearest-neighbor sample of a band onto the output grid.
///
/// Cells with no source pixel (outside the band, or nodata) become NaN.
fn resample_band(
    band: &Raster<f64>,
    params: &RasterExportParams,
    rows: usize,
    cols: usize,
) -> Vec<f32> {
    let (min_x, _, _, max_y) = params.region;
    let res = params.resolution;

    let mut data = vec![f32::NAN; rows * cols];
    for row in 0..rows {
        let y = max_y - (row as f64 + 0.5) * res;
        for col in 0..cols {
            let x = min_x + (col as f64 + 0.5) * res;
            if let Some(value) = band.sample(x, y) {
                data[row * cols + col] = value as f32;
            }
        }
    }
    data
}

/// Minimal GeoKeyDirectory: model type, raster type, and the EPSG code when
/// known (geographic key for EPSG:4326, projected key otherwise).
fn geo_key_directory(crs: &CRS) -> Vec<u16> {
    let geographic = crs.epsg() == Some(4326);
    let model_type: u16 = if geographic { 2 } else { 1 };

    let mut keys: Vec<u16> = vec![
        1024, 0, 1, model_type, // GTModelTypeGeoKey
        1025, 0, 1, 1, // GTRasterTypeGeoKey = RasterPixelIsArea
    ];
    // Key values are u16; codes outside that range cannot be represented in
    // the directory, so the EPSG key is omitted rather than truncated.
    if let Some(code) = crs.epsg().and_then(|c| u16::try_from(c).ok()) {
        let key_id: u16 = if geographic { 2048 } else { 3072 };
        keys.extend_from_slice(&[key_id, 0, 1, code]);
    }

    let entry_count = (keys.len() / 4) as u16;
    let mut directory = vec![1, 1, 0, entry_count];
    directory.extend_from_slice(&keys);
    directory
}
