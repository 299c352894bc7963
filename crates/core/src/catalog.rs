//! Asset catalog: resolve opaque identifiers to collections
//!
//! Identifiers such as `"MODIS/061/MYD13A3"` are opaque keys; their format
//! belongs to the backing catalog, not to this crate.

use crate::error::{Error, Result};
use crate::image::ImageCollection;
use crate::vector::FeatureCollection;
use std::collections::{HashMap, HashSet};

/// Read-only access to a data catalog.
pub trait Catalog {
    /// Resolve an image collection by identifier.
    fn image_collection(&self, id: &str) -> Result<ImageCollection>;

    /// Resolve a feature collection by identifier.
    fn feature_collection(&self, id: &str) -> Result<FeatureCollection>;
}

/// In-memory catalog backend.
///
/// Assets are registered up front; lookups fail with `NotFound` for unknown
/// identifiers and `AccessDenied` for restricted ones.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    images: HashMap<String, ImageCollection>,
    features: HashMap<String, FeatureCollection>,
    restricted: HashSet<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image collection under an identifier
    pub fn insert_image_collection(
        &mut self,
        id: impl Into<String>,
        collection: ImageCollection,
    ) {
        self.images.insert(id.into(), collection);
    }

    /// Register a feature collection under an identifier
    pub fn insert_feature_collection(
        &mut self,
        id: impl Into<String>,
        collection: FeatureCollection,
    ) {
        self.features.insert(id.into(), collection);
    }

    /// Deny read access to an identifier
    pub fn restrict(&mut self, id: impl Into<String>) {
        self.restricted.insert(id.into());
    }

    fn check_access(&self, id: &str) -> Result<()> {
        if self.restricted.contains(id) {
            return Err(Error::AccessDenied { id: id.to_string() });
        }
        Ok(())
    }
}

impl Catalog for MemoryCatalog {
    fn image_collection(&self, id: &str) -> Result<ImageCollection> {
        self.check_access(id)?;
        self.images
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    fn feature_collection(&self, id: &str) -> Result<FeatureCollection> {
        self.check_access(id)?;
        self.features
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::raster::Raster;
    use chrono::NaiveDate;

    fn sample_collection() -> ImageCollection {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        ImageCollection::new(vec![Image::single_band(
            date,
            "NDVI",
            Raster::filled(2, 2, 0.5),
        )])
    }

    #[test]
    fn test_lookup_roundtrip() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert_image_collection("MODIS/061/MYD13A3", sample_collection());

        let collection = catalog.image_collection("MODIS/061/MYD13A3").unwrap();
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_not_found() {
        let catalog = MemoryCatalog::new();
        let err = catalog.image_collection("MODIS/061/MOD13A3").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let err = catalog.feature_collection("projects/x/assets/Ostan").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_access_denied() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert_image_collection("private/asset", sample_collection());
        catalog.restrict("private/asset");

        let err = catalog.image_collection("private/asset").unwrap_err();
        assert!(matches!(err, Error::AccessDenied { .. }));
    }
}
