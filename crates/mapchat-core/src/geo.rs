//! Geocoded locations returned by the assistant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A named place with coordinates.
///
/// Produced only from backend replies; a list of these is always applied to the
/// map as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoLocation {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }

    /// Reads one location from a JSON object, rejecting missing names,
    /// non-numeric coordinates and coordinates outside the valid ranges.
    fn from_value(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected an object, got {value}"))?;
        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or("missing string field `name`")?;
        let lat = obj
            .get("lat")
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("`{name}` has no numeric `lat`"))?;
        let lon = obj
            .get("lon")
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("`{name}` has no numeric `lon`"))?;

        let location = Self::new(name, lat, lon);
        if !location.position().is_valid() {
            return Err(format!("`{name}` is out of range ({lat}, {lon})"));
        }
        Ok(location)
    }
}

/// Classification of the `coordinates` field of a reply.
///
/// Only `Locations` leads to a map update; the other variants leave the map
/// exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatePayload {
    /// A non-empty list where every element is well formed.
    Locations(Vec<GeoLocation>),
    /// The field was missing or null.
    Absent,
    /// The field was an empty array.
    Empty,
    /// The field was present but not a list of valid locations.
    Malformed(String),
}

impl CoordinatePayload {
    pub fn classify(value: Option<&Value>) -> Self {
        let items = match value {
            None | Some(Value::Null) => return Self::Absent,
            Some(Value::Array(items)) => items,
            Some(other) => return Self::Malformed(format!("expected an array, got {other}")),
        };
        if items.is_empty() {
            return Self::Empty;
        }

        match items
            .iter()
            .map(GeoLocation::from_value)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(locations) => Self::Locations(locations),
            Err(reason) => Self::Malformed(reason),
        }
    }

    pub fn into_locations(self) -> Option<Vec<GeoLocation>> {
        match self {
            Self::Locations(locations) => Some(locations),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_well_formed_list() {
        let value = json!([
            {"name": "Cafe A", "lat": 18.52, "lon": 73.85},
            {"name": "Cafe B", "lat": 18.53, "lon": 73.86}
        ]);
        let payload = CoordinatePayload::classify(Some(&value));
        assert_eq!(
            payload,
            CoordinatePayload::Locations(vec![
                GeoLocation::new("Cafe A", 18.52, 73.85),
                GeoLocation::new("Cafe B", 18.53, 73.86),
            ])
        );
    }

    #[test]
    fn test_classify_absent_and_empty() {
        assert_eq!(CoordinatePayload::classify(None), CoordinatePayload::Absent);
        assert_eq!(
            CoordinatePayload::classify(Some(&Value::Null)),
            CoordinatePayload::Absent
        );
        assert_eq!(
            CoordinatePayload::classify(Some(&json!([]))),
            CoordinatePayload::Empty
        );
    }

    #[test]
    fn test_classify_rejects_non_array() {
        let payload = CoordinatePayload::classify(Some(&json!({"name": "x"})));
        assert!(matches!(payload, CoordinatePayload::Malformed(_)));
    }

    #[test]
    fn test_one_bad_element_rejects_whole_list() {
        let value = json!([
            {"name": "Good", "lat": 1.0, "lon": 2.0},
            {"name": "Bad", "lat": "north", "lon": 2.0}
        ]);
        let payload = CoordinatePayload::classify(Some(&value));
        assert!(matches!(payload, CoordinatePayload::Malformed(ref r) if r.contains("Bad")));
        assert!(payload.into_locations().is_none());
    }

    #[test]
    fn test_out_of_range_is_malformed() {
        let value = json!([{"name": "Nowhere", "lat": 91.0, "lon": 0.0}]);
        assert!(matches!(
            CoordinatePayload::classify(Some(&value)),
            CoordinatePayload::Malformed(_)
        ));
    }

    #[test]
    fn test_integer_coordinates_are_numeric() {
        let value = json!([{"name": "Origin", "lat": 0, "lon": 0}]);
        let locations = CoordinatePayload::classify(Some(&value))
            .into_locations()
            .unwrap();
        assert_eq!(locations[0].position(), LatLng::new(0.0, 0.0));
    }
}
