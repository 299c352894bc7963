//! Dated multi-band images and ordered image collections
//!
//! An `Image` is a set of named single-band rasters sharing one grid, tagged
//! with an acquisition date. An `ImageCollection` is an ordered sequence of
//! images; its operations never mutate in place, they derive new collections.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster};
use chrono::NaiveDate;

/// A multi-band raster image with an acquisition date.
///
/// All bands share dimensions and georeferencing. Band order is preserved.
#[derive(Debug, Clone)]
pub struct Image {
    date: NaiveDate,
    bands: Vec<(String, Raster<f64>)>,
}

impl Image {
    /// Create an image from named bands.
    ///
    /// Fails with `SizeMismatch` when bands disagree on dimensions.
    pub fn new(date: NaiveDate, bands: Vec<(String, Raster<f64>)>) -> Result<Self> {
        if let Some((_, first)) = bands.first() {
            let (er, ec) = first.shape();
            for (_, band) in &bands[1..] {
                let (ar, ac) = band.shape();
                if (ar, ac) != (er, ec) {
                    return Err(Error::SizeMismatch { er, ec, ar, ac });
                }
            }
        }
        Ok(Self { date, bands })
    }

    /// Create a single-band image
    pub fn single_band(date: NaiveDate, name: impl Into<String>, raster: Raster<f64>) -> Self {
        Self {
            date,
            bands: vec![(name.into(), raster)],
        }
    }

    /// Create an image with no bands (a valid degenerate stack)
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            bands: Vec::new(),
        }
    }

    /// Acquisition date
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Acquisition month formatted `YYYY-MM`
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Look up a band by name
    pub fn band(&self, name: &str) -> Result<&Raster<f64>> {
        self.bands
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
            .ok_or_else(|| Error::BandNotFound {
                band: name.to_string(),
            })
    }

    /// All bands in order
    pub fn bands(&self) -> &[(String, Raster<f64>)] {
        &self.bands
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Dimensions as (rows, cols); `None` for a zero-band image
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.bands.first().map(|(_, r)| r.shape())
    }

    /// Georeferencing of the shared grid; `None` for a zero-band image
    pub fn transform(&self) -> Option<&GeoTransform> {
        self.bands.first().map(|(_, r)| r.transform())
    }

    /// CRS of the shared grid
    pub fn crs(&self) -> Option<&CRS> {
        self.bands.first().and_then(|(_, r)| r.crs())
    }
}

/// An ordered sequence of images sharing a band schema.
#[derive(Debug, Clone, Default)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.images.iter()
    }

    /// Restrict to images acquired in the half-open interval `[start, end)`.
    ///
    /// Preserves the original sequence order. An empty result is valid, not
    /// an error.
    pub fn filter_date(&self, start: NaiveDate, end: NaiveDate) -> ImageCollection {
        let images = self
            .images
            .iter()
            .filter(|img| img.date() >= start && img.date() < end)
            .cloned()
            .collect();
        ImageCollection { images }
    }

    /// Project every image down to one named band.
    ///
    /// Fails with `BandNotFound` when any image lacks the band.
    pub fn select(&self, band: &str) -> Result<ImageCollection> {
        let images = self
            .images
            .iter()
            .map(|img| {
                let raster = img.band(band)?.clone();
                Ok(Image::single_band(img.date(), band, raster))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ImageCollection { images })
    }
}

impl IntoIterator for ImageCollection {
    type Item = Image;
    type IntoIter = std::vec::IntoIter<Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}
