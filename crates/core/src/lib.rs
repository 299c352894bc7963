//! # Terraseries Core
//!
//! Core types for the terraseries extraction pipelines.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS`: Coordinate Reference System handling
//! - `Image` / `ImageCollection`: dated multi-band rasters
//! - `Feature` / `FeatureCollection`: vector geometries with attributes
//! - `Catalog`: asset resolution by opaque identifier

pub mod catalog;
pub mod crs;
pub mod error;
pub mod image;
pub mod raster;
pub mod vector;

pub use catalog::{Catalog, MemoryCatalog};
pub use crs::CRS;
pub use error::{Error, Result};
pub use image::{Image, ImageCollection};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, Feature, FeatureCollection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::{Catalog, MemoryCatalog};
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::image::{Image, ImageCollection};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
}
