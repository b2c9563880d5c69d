use std::f64::consts::{FRAC_PI_2, TAU};

use bevy::math::{DVec3, Vec3, Vec3A};
use bevy::render::primitives::Sphere;

const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const WGS84_ECCENTRICITY_SQUARED: f64 = 6.694_379_990_141_316e-3;

/// Earth-centred, earth-fixed position of a WGS84 geodetic coordinate.
/// Longitude and latitude are in radians, height in metres above the ellipsoid.
pub fn geodetic_to_ecef(longitude: f64, latitude: f64, height: f64) -> DVec3 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    let prime_vertical =
        WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();

    DVec3::new(
        (prime_vertical + height) * cos_lat * cos_lon,
        (prime_vertical + height) * cos_lat * sin_lon,
        (prime_vertical * (1.0 - WGS84_ECCENTRICITY_SQUARED) + height) * sin_lat,
    )
}

/// Axis-oriented box in tileset coordinates: centre plus half-extents.
/// Used for camera framing, distance estimates and culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub center: DVec3,
    pub half_extents: DVec3,
}

impl BoundingBox {
    pub fn new(center: DVec3, half_extents: DVec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// 3D Tiles `box`: centre followed by the x, y and z half-axis vectors.
    /// Oriented boxes collapse to the lengths of their half-axes.
    pub fn from_oriented_box(values: &[f64; 12]) -> Self {
        let axis = |offset: usize| {
            DVec3::new(values[offset], values[offset + 1], values[offset + 2]).length()
        };
        Self::new(
            DVec3::new(values[0], values[1], values[2]),
            DVec3::new(axis(3), axis(6), axis(9)),
        )
    }

    /// 3D Tiles `sphere`: centre and radius.
    pub fn from_sphere(values: &[f64; 4]) -> Self {
        Self::new(
            DVec3::new(values[0], values[1], values[2]),
            DVec3::splat(values[3]),
        )
    }

    /// 3D Tiles `region`: `[west, south, east, north, min height, max height]`
    /// in radians and metres. The result is the ECEF box enclosing the region.
    pub fn from_region(values: &[f64; 6]) -> Self {
        let [west, south, east, north, min_height, max_height] = *values;
        let east = if east < west { east + TAU } else { east };

        // Each ECEF axis is extremal on the region edges or where the region
        // crosses the equator or a quarter meridian.
        let mut longitudes = vec![west, east];
        longitudes.extend(
            (-4..=8)
                .map(|quarter| quarter as f64 * FRAC_PI_2)
                .filter(|&longitude| longitude > west && longitude < east),
        );
        let mut latitudes = vec![south, north];
        if south < 0.0 && north > 0.0 {
            latitudes.push(0.0);
        }

        let mut min = DVec3::INFINITY;
        let mut max = DVec3::NEG_INFINITY;
        for &longitude in &longitudes {
            for &latitude in &latitudes {
                for height in [min_height, max_height] {
                    let point = geodetic_to_ecef(longitude, latitude, height);
                    min = min.min(point);
                    max = max.max(point);
                }
            }
        }

        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    /// Full diagonal length, twice the half-extent norm.
    pub fn size(&self) -> f64 {
        self.half_extents.length() * 2.0
    }

    /// Radius of the enclosing sphere.
    pub fn radius(&self) -> f64 {
        self.half_extents.length()
    }

    /// Distance from a point to the enclosing sphere, never below `f64::EPSILON`.
    pub fn distance_to(&self, point: DVec3) -> f64 {
        (point.distance(self.center) - self.radius()).max(f64::EPSILON)
    }

    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            center: self.center + offset,
            half_extents: self.half_extents,
        }
    }

    /// Enclosing sphere for frustum tests in single precision.
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere {
            center: Vec3A::from(self.center.as_vec3()),
            radius: self.radius() as f32,
        }
    }

    pub fn center_f32(&self) -> Vec3 {
        self.center.as_vec3()
    }

    pub fn size_f32(&self) -> Vec3 {
        (self.half_extents * 2.0).as_vec3()
    }
}
