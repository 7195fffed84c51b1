//! Geographic point value object.

use serde_json::{json, Value as JsonValue};
use std::fmt;

use crate::error::{MessageError, MessageResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> MessageResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(MessageError::assertion(format!(
                "Latitude [{lat}] must be within [-90, 90]"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(MessageError::assertion(format!(
                "Longitude [{lon}] must be within [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Parses the `lat,lon` string form.
    pub fn from_string(value: &str) -> MessageResult<Self> {
        let (lat, lon) = value.split_once(',').ok_or_else(|| {
            MessageError::assertion(format!("GeoPoint [{value}] must be in the form lat,lon"))
        })?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| MessageError::assertion(format!("GeoPoint [{value}] is invalid: {e}")))
        };
        Self::new(parse(lat)?, parse(lon)?)
    }

    /// Parses the GeoJSON form `{"type":"Point","coordinates":[lon,lat]}`.
    pub fn from_object(value: &JsonValue) -> MessageResult<Self> {
        let coordinates = value
            .get("coordinates")
            .and_then(JsonValue::as_array)
            .filter(|c| c.len() == 2)
            .ok_or_else(|| {
                MessageError::assertion(format!(
                    "GeoPoint object [{value}] must contain two coordinates"
                ))
            })?;
        let number = |v: &JsonValue| {
            v.as_f64().ok_or_else(|| {
                MessageError::assertion(format!("GeoPoint coordinate [{v}] must be a number"))
            })
        };
        Self::new(number(&coordinates[1])?, number(&coordinates[0])?)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn to_object(&self) -> JsonValue {
        json!({
            "type": "Point",
            "coordinates": [self.lon, self.lat],
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_object_forms() {
        let point = GeoPoint::from_string("34.0522, -118.2437").unwrap();
        assert_eq!(point.lat(), 34.0522);
        assert_eq!(point.lon(), -118.2437);
        assert_eq!(point.to_object()["coordinates"][0], json!(-118.2437));
        assert_eq!(GeoPoint::from_object(&point.to_object()).unwrap(), point);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
        assert!(GeoPoint::from_string("nope").is_err());
        assert!(GeoPoint::from_object(&json!({"coordinates": [1.0]})).is_err());
    }
}
