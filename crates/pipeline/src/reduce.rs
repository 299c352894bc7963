//! Per-image spatial reduction onto station footprints
//!
//! For each station feature, aggregates pixel values intersecting its
//! footprint at a fixed ground sample distance, producing one attributed
//! record per station per image. Reductions are independent across both
//! images and stations.

use geo::{BoundingRect, Contains};
use geo_types::{Geometry, Point};
use rayon::prelude::*;
use terraseries_core::raster::Raster;
use terraseries_core::vector::{AttributeValue, Feature, FeatureCollection};
use terraseries_core::{Error, Image, Result};

/// Spatial aggregation function applied over a footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
}

/// Parameters for region reduction
#[derive(Debug, Clone, Copy)]
pub struct ReduceParams {
    /// Sampling resolution in georeferenced units
    pub ground_sample_distance: f64,
    /// Value reported for footprints with zero valid samples
    pub fill_value: f64,
}

impl Default for ReduceParams {
    fn default() -> Self {
        Self {
            ground_sample_distance: 1000.0,
            fill_value: -999.0,
        }
    }
}

/// Reduce one single-band image onto every station footprint.
///
/// Returns one feature per station, in station order, carrying the station's
/// attributes plus `mean` and `date` (the image's acquisition month,
/// `YYYY-MM`). A footprint with zero valid samples yields the fill value,
/// never an absent record, so every (station, month) pair in range surfaces
/// exactly once.
pub fn reduce_regions(
    image: &Image,
    stations: &FeatureCollection,
    reducer: Reducer,
    params: &ReduceParams,
) -> Result<Vec<Feature>> {
    if params.ground_sample_distance <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "ground_sample_distance",
            value: params.ground_sample_distance.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let (_, raster) = image
        .bands()
        .first()
        .ok_or_else(|| Error::Other("cannot reduce an image with no bands".to_string()))?;

    let date = image.month_key();

    stations
        .features
        .par_iter()
        .map(|station| {
            let samples = match &station.geometry {
                Some(geometry) => footprint_samples(raster, geometry, params)?,
                None => Vec::new(),
            };

            let value = match reducer {
                Reducer::Mean => {
                    if samples.is_empty() {
                        params.fill_value
                    } else {
                        samples.iter().sum::<f64>() / samples.len() as f64
                    }
                }
            };

            let mut out = station.clone();
            out.set_property("mean", AttributeValue::Float(value));
            out.set_property("date", AttributeValue::String(date.clone()));
            Ok(out)
        })
        .collect()
}

/// Collect valid pixel values over a geometry's footprint.
///
/// Points sample the containing pixel. Polygonal footprints are sampled on a
/// gsd-spaced lattice over their bounds, filtered by point-in-polygon; each
/// lattice node reads the pixel containing it. Sampling happens in the
/// raster's own CRS.
fn footprint_samples(
    raster: &Raster<f64>,
    geometry: &Geometry<f64>,
    params: &ReduceParams,
) -> Result<Vec<f64>> {
    match geometry {
        Geometry::Point(p) => Ok(raster.sample(p.x(), p.y()).into_iter().collect()),

        Geometry::Polygon(poly) => Ok(lattice_samples(raster, poly, params)),

        Geometry::MultiPolygon(mp) => Ok(lattice_samples(raster, mp, params)),

        _ => Err(Error::InvalidParameter {
            name: "geometry",
            value: "unsupported geometry type".to_string(),
            reason: "only point and polygon footprints are supported".to_string(),
        }),
    }
}

fn lattice_samples<G>(raster: &Raster<f64>, shape: &G, params: &ReduceParams) -> Vec<f64>
where
    G: BoundingRect<f64, Output = Option<geo_types::Rect<f64>>> + Contains<Point<f64>>,
{
    let Some(rect) = shape.bounding_rect() else {
        return Vec::new();
    };

    let gsd = params.ground_sample_distance;
    let mut samples = Vec::new();

    let mut y = rect.min().y + gsd / 2.0;
    while y <= rect.max().y {
        let mut x = rect.min().x + gsd / 2.0;
        while x <= rect.max().x {
            if shape.contains(&Point::new(x, y)) {
                if let Some(value) = raster.sample(x, y) {
                    samples.push(value);
                }
            }
            x += gsd;
        }
        y += gsd;
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use geo_types::{polygon, Point};
    use terraseries_core::GeoTransform;

    fn monthly_image(values: &[f64]) -> Image {
        // 2x2 grid covering (0,0)..(2,2), one unit per pixel
        let mut raster = Raster::from_vec(values.to_vec(), 2, 2).unwrap();
        raster.set_transform(GeoTransform::new(0.0, 2.0, 1.0, -1.0));
        Image::single_band(
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            "NDVI",
            raster,
        )
    }

    fn station(x: f64, y: f64, name: &str) -> Feature {
        let mut f = Feature::new(Geometry::Point(Point::new(x, y)));
        f.set_property("station", AttributeValue::String(name.to_string()));
        f
    }

    fn params() -> ReduceParams {
        ReduceParams {
            ground_sample_distance: 1.0,
            fill_value: -999.0,
        }
    }

    #[test]
    fn test_point_samples_containing_pixel() {
        let image = monthly_image(&[1.0, 2.0, 3.0, 4.0]);
        let stations = FeatureCollection::from_features(vec![
            station(0.5, 1.5, "nw"),
            station(1.5, 0.5, "se"),
        ]);

        let rows = reduce_regions(&image, &stations, Reducer::Mean, &params()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_relative_eq!(
            rows[0].get_property("mean").unwrap().as_f64().unwrap(),
            1.0
        );
        assert_relative_eq!(
            rows[1].get_property("mean").unwrap().as_f64().unwrap(),
            4.0
        );
    }

    #[test]
    fn test_attaches_date_and_keeps_attributes() {
        let image = monthly_image(&[1.0, 2.0, 3.0, 4.0]);
        let stations = FeatureCollection::from_features(vec![station(0.5, 1.5, "nw")]);

        let rows = reduce_regions(&image, &stations, Reducer::Mean, &params()).unwrap();
        assert_eq!(
            rows[0].get_property("date"),
            Some(&AttributeValue::String("2000-01".to_string()))
        );
        assert_eq!(
            rows[0].get_property("station"),
            Some(&AttributeValue::String("nw".to_string()))
        );
    }

    #[test]
    fn test_polygon_mean_over_footprint() {
        let image = monthly_image(&[1.0, 2.0, 3.0, 4.0]);
        // Covers the whole 2x2 grid
        let footprint = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let stations =
            FeatureCollection::from_features(vec![Feature::new(Geometry::Polygon(footprint))]);

        let rows = reduce_regions(&image, &stations, Reducer::Mean, &params()).unwrap();
        assert_relative_eq!(
            rows[0].get_property("mean").unwrap().as_f64().unwrap(),
            2.5
        );
    }

    #[test]
    fn test_dry_footprint_surfaces_fill_value() {
        let image = monthly_image(&[1.0, 2.0, 3.0, 4.0]);
        // Far outside the grid
        let stations = FeatureCollection::from_features(vec![station(100.0, 100.0, "dry")]);

        let rows = reduce_regions(&image, &stations, Reducer::Mean, &params()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_relative_eq!(
            rows[0].get_property("mean").unwrap().as_f64().unwrap(),
            -999.0
        );
    }

    #[test]
    fn test_filled_sentinel_participates_in_mean() {
        // Unmasked image: the -999 fill is a value, not nodata, and must
        // drag the mean down rather than be skipped.
        let image = monthly_image(&[-999.0, 1.0, 1.0, 1.0]);
        let footprint = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let stations =
            FeatureCollection::from_features(vec![Feature::new(Geometry::Polygon(footprint))]);

        let rows = reduce_regions(&image, &stations, Reducer::Mean, &params()).unwrap();
        assert_relative_eq!(
            rows[0].get_property("mean").unwrap().as_f64().unwrap(),
            -249.0
        );
    }

    #[test]
    fn test_rejects_nonpositive_gsd() {
        let image = monthly_image(&[1.0, 2.0, 3.0, 4.0]);
        let stations = FeatureCollection::from_features(vec![station(0.5, 0.5, "s")]);
        let bad = ReduceParams {
            ground_sample_distance: 0.0,
            fill_value: -999.0,
        };

        assert!(reduce_regions(&image, &stations, Reducer::Mean, &bad).is_err());
    }
}
