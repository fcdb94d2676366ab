//! The small geometric vocabulary of the converter: typed distances and GPS coordinates, with the
//! ellipsoidal distance solver the graph contraction depends on.

use serde::{Deserialize, Deserializer, Serializer};

mod distance;
mod gps;

pub use crate::distance::Distance;
pub use crate::gps::{LonLat, NonConvergence};

/// Reduce the precision of an f64. This helps ensure serialization is idempotent and stable across
/// platforms.
pub fn trim_f64(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Serializes a trimmed `f64`.
pub fn serialize_f64<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(trim_f64(*x))
}

/// Deserializes a trimmed `f64`.
pub fn deserialize_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let x = f64::deserialize(d)?;
    Ok(trim_f64(x))
}
