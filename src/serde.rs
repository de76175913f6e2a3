//! # Serde module for MvpResult
//!
//! This module provides serde-based (serialization and deserialization) features for
//! [`MvpResult`]. A result is written as the tuple `(q, d, b, t, mvp)`, where `q` and `t` are
//! `null` when the estimator family does not use them.
//!
//! Deserialization goes through [`MvpResult::try_new`], so records with a non-positive or
//! non-finite `mvp`, a negative `q` or `t`, or a non-finite `b` are rejected instead of
//! producing a result that violates its invariants.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::family::Point;
use crate::result::MvpResult;

impl Serialize for MvpResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(5)?;
        tup.serialize_element(&self.q())?;
        tup.serialize_element(&self.d())?;
        tup.serialize_element(&self.b())?;
        tup.serialize_element(&self.t())?;
        tup.serialize_element(&self.mvp())?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for MvpResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (q, d, b, t, mvp): (Option<f64>, u32, f64, Option<f64>, f64) =
            Deserialize::deserialize(deserializer)?;
        MvpResult::try_new(Point::new(q, d, b, t), mvp).map_err(Error::custom)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Point::new(Some(6.0), 2, 2.0, Some(0.75)), 4.9 => "[6.0,2,2.0,0.75,4.9]"; "ratio average")]
    #[test_case(Point::new(None, 0, 1.5, None), 3.0 => "[null,0,1.5,null,3.0]"; "compressed")]
    fn test_serde(point: Point, mvp: f64) -> String {
        let original = MvpResult::try_new(point, mvp).unwrap();
        let serialized = serde_json::to_string(&original).expect("serialization failed");
        let deserialized: MvpResult =
            serde_json::from_str(&serialized).expect("deserialization failed");
        assert_eq!(original, deserialized);
        serialized
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let result: Result<MvpResult, _> = serde_json::from_str("{ invalid_json_string }");
        assert!(result.is_err());
    }

    #[test_case("[6.0,2,2.0,1.0,0.0]"; "zero mvp")]
    #[test_case("[6.0,2,2.0,1.0,-4.0]"; "negative mvp")]
    #[test_case("[-6.0,2,2.0,1.0,4.0]"; "negative q")]
    #[test_case("[6.0,-2,2.0,1.0,4.0]"; "negative d")]
    #[test_case("[6.0,2,2.0,-1.0,4.0]"; "negative t")]
    #[test_case("[6.0,2,2.0,1.0]"; "short tuple")]
    fn test_failed_deserialization(input: &str) {
        let result: Result<MvpResult, _> = serde_json::from_str(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_error_message() {
        let err = serde_json::from_str::<MvpResult>("[6.0,2,2.0,1.0,0.0]").unwrap_err();
        assert!(err
            .to_string()
            .contains("invalid result record: mvp must be positive and finite"));
    }
}
