//! Pipeline configuration
//!
//! Every pipeline parameter lives in one of these structs; the drivers take
//! them whole. Both deserialize from TOML, with defaults matching the MODIS
//! monthly-product conventions the pipelines were built around.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use terraseries_core::{Error, Result};

fn default_scale() -> f64 {
    0.0001
}

fn default_fill() -> f64 {
    -999.0
}

fn default_gsd() -> f64 {
    1000.0
}

fn default_crs() -> String {
    "EPSG:4326".to_string()
}

fn default_max_pixels() -> u64 {
    10_000_000_000_000
}

/// Optional per-pixel time weighting applied instead of the affine rescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    /// Affine rescale only
    #[default]
    None,
    /// `value * days_in_month * 24`
    HoursInMonth,
}

/// Configuration for the station time-series pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Catalog identifier of the image collection
    pub dataset_id: String,
    /// Catalog identifier of the station feature collection
    pub stations_id: String,
    /// Inclusive start of the date range
    pub start_date: NaiveDate,
    /// Exclusive end of the date range
    pub end_date: NaiveDate,
    /// Band to extract
    pub band: String,
    /// Multiplicative rescale factor
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Additive rescale offset (e.g. -273.15 for Kelvin to Celsius)
    #[serde(default)]
    pub offset: f64,
    /// Fill sentinel for missing samples
    #[serde(default = "default_fill")]
    pub fill_value: f64,
    /// Sampling resolution in georeferenced units
    #[serde(default = "default_gsd")]
    pub ground_sample_distance: f64,
    /// Opt-in time weighting
    #[serde(default)]
    pub weighting: Weighting,
    /// Output name; derived from the dataset when absent
    #[serde(default)]
    pub description: Option<String>,
}

impl ExtractionConfig {
    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Output name, e.g. `MYD13A3_Monthly_NDVI_2000_2011`
    pub fn description(&self) -> String {
        match &self.description {
            Some(d) => d.clone(),
            None => format!(
                "{}_Monthly_{}_{}_{}",
                dataset_short_name(&self.dataset_id),
                self.band,
                self.start_date.year(),
                self.end_date.year(),
            ),
        }
    }
}

/// Configuration for the clipped-stack pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct StackExportConfig {
    /// Catalog identifier of the image collection
    pub dataset_id: String,
    /// Catalog identifier of the boundary feature collection
    pub boundary_id: String,
    /// Inclusive start of the date range
    pub start_date: NaiveDate,
    /// Exclusive end of the date range
    pub end_date: NaiveDate,
    /// Band to stack
    pub band: String,
    /// Multiplicative rescale factor
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Additive rescale offset
    #[serde(default)]
    pub offset: f64,
    /// Output resolution in georeferenced units
    #[serde(default = "default_gsd")]
    pub ground_sample_distance: f64,
    /// Output CRS identifier
    #[serde(default = "default_crs")]
    pub crs: String,
    /// Pixel budget for the export
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
    /// Output name; derived from the dataset when absent
    #[serde(default)]
    pub description: Option<String>,
}

impl StackExportConfig {
    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Output name, e.g. `MOD13A3_Monthly_NDVI`
    pub fn description(&self) -> String {
        match &self.description {
            Some(d) => d.clone(),
            None => format!(
                "{}_Monthly_{}",
                dataset_short_name(&self.dataset_id),
                self.band
            ),
        }
    }
}

/// Last path segment of a catalog identifier, e.g. `MYD13A3` from
/// `MODIS/061/MYD13A3`.
fn dataset_short_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}
