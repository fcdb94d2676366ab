use std::fmt;

use thiserror::Error;

use crate::Distance;

// WGS-84 reference ellipsoid
const EQUATORIAL_RADIUS_METERS: f64 = 6_378_137.0;
const POLAR_RADIUS_METERS: f64 = 6_356_752.314245;

// The fixed-point iteration on longitude stops when successive values differ by less than this
// many radians.
const CONVERGENCE_TOLERANCE: f64 = 6e-5;
const MAX_ITERATIONS: usize = 100;

/// Vincenty's method has no solution for some nearly-antipodal pairs; the iteration oscillates
/// instead of converging.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no geodesic solution after {iterations} iterations")]
pub struct NonConvergence {
    pub iterations: usize,
}

/// Longitude is x, latitude is y, both in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    /// The shortest surface distance to `other` along the WGS-84 ellipsoid, using Vincenty's
    /// inverse formula. Coincident points are exactly zero. Nearly-antipodal pairs may not
    /// converge, and pairs lying on the equator converge loosely (the tolerance cuts the
    /// iteration short).
    pub fn gps_dist_meters(self, other: LonLat) -> Result<Distance, NonConvergence> {
        // The raw formula divides by sin(sigma), which is 0 for coincident points.
        if self == other {
            return Ok(Distance::ZERO);
        }

        let f = 1.0 - POLAR_RADIUS_METERS / EQUATORIAL_RADIUS_METERS;
        // Reduced latitudes on the auxiliary sphere
        let u1 = ((1.0 - f) * self.latitude.to_radians().tan()).atan();
        let u2 = ((1.0 - f) * other.latitude.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        // lambda is the longitudinal difference on the auxiliary sphere.
        let mut lambda = delta_lon;
        let mut iterations = 0;
        let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let sin_sigma =
                (cos_u2 * sin_lambda).hypot(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
            if sin_sigma == 0.0 {
                return Ok(Distance::ZERO);
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            // sigma is the angle between the points on the auxiliary sphere.
            let sigma = sin_sigma.atan2(cos_sigma);
            // alpha is the azimuth of the geodesic at the equator.
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha.powi(2);
            // cos_sq_alpha is 0 when both points lie on the equator.
            let cos_2sigma_m = if cos_sq_alpha == 0.0 {
                0.0
            } else {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let last_lambda = lambda;
            lambda = delta_lon
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_alpha
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));
            if (lambda - last_lambda).abs() < CONVERGENCE_TOLERANCE {
                break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
            }
            iterations += 1;
            if iterations == MAX_ITERATIONS {
                return Err(NonConvergence { iterations });
            }
        };

        let u_sq = cos_sq_alpha
            * (EQUATORIAL_RADIUS_METERS.powi(2) - POLAR_RADIUS_METERS.powi(2))
            / POLAR_RADIUS_METERS.powi(2);
        let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = b
            * sin_sigma
            * (cos_2sigma_m
                + b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                        - b / 6.0 * cos_2sigma_m * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
        Ok(Distance::meters(
            POLAR_RADIUS_METERS * a * (sigma - delta_sigma),
        ))
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points() {
        let pt = LonLat::new(-74.4474, 40.5008);
        assert_eq!(pt.gps_dist_meters(pt), Ok(Distance::ZERO));
    }

    #[test]
    fn one_degree_of_latitude_at_the_equator() {
        let a = LonLat::new(0.0, 0.0);
        let b = LonLat::new(0.0, 1.0);
        // The published meridian arc length for the first degree of latitude
        let expected = 110_574.4;
        let dist = a.gps_dist_meters(b).unwrap();
        assert!(
            (dist.inner_meters() - expected).abs() < 1.0,
            "got {}, expected about {}m",
            dist,
            expected
        );
        assert_eq!(dist, b.gps_dist_meters(a).unwrap());
    }

    #[test]
    fn short_hop() {
        let a = LonLat::new(-74.4474, 40.5008);
        let b = LonLat::new(-74.4474, 40.5018);
        let dist = a.gps_dist_meters(b).unwrap();
        // A thousandth of a degree of latitude is on the order of a city block.
        assert!(
            dist > Distance::meters(100.0) && dist < Distance::meters(120.0),
            "got {}",
            dist
        );
    }

    #[test]
    fn antipodal_points_dont_converge() {
        let a = LonLat::new(0.0, 0.0);
        let b = LonLat::new(180.0, 0.0);
        assert_eq!(
            a.gps_dist_meters(b),
            Err(NonConvergence {
                iterations: MAX_ITERATIONS
            })
        );
    }
}
