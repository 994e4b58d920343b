use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WGS84 position. Stored lat/lon; OSRM wants lon,lat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Format as an OSRM path segment: `lon,lat`.
    pub fn to_osrm(self) -> String {
        format!("{},{}", self.lon, self.lat)
    }

    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

/// Parses `lat,lon`, the form used on the command line and in config.
impl FromStr for Coordinate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("Invalid coordinate: {s}. Expected 'lat,lon'."))?;
        let coord = Coordinate {
            lat: lat.trim().parse()?,
            lon: lon.trim().parse()?,
        };
        if !coord.is_valid() {
            anyhow::bail!("Coordinate out of range: {s}");
        }
        Ok(coord)
    }
}

/// A physical waste container as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trashbin {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub coordinate: Coordinate,

    /// Fill level in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_level: Option<f64>,

    /// Battery level in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,

    /// Noise level in dB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Trashbin {
    pub fn needs_collection(&self, threshold: f64) -> bool {
        self.fill_level.is_some_and(|level| level >= threshold)
    }

    pub fn battery_low(&self, threshold: f64) -> bool {
        self.battery_level.is_some_and(|level| level < threshold)
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One time-stamped level value from one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
    pub level: f64,
}

/// A bin selected for collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub coordinate: Coordinate,
}

impl Stop {
    pub fn new(id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            coordinate,
        }
    }
}

impl From<&Trashbin> for Stop {
    fn from(bin: &Trashbin) -> Self {
        Stop::new(bin.id.clone(), bin.coordinate)
    }
}

/// Stops for every bin at or above `threshold`, in input order.
pub fn select_for_collection(bins: &[Trashbin], threshold: f64) -> Vec<Stop> {
    bins.iter()
        .filter(|b| b.needs_collection(threshold))
        .map(Stop::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(id: &str, fill: Option<f64>, battery: Option<f64>) -> Trashbin {
        Trashbin {
            id: id.to_string(),
            name: None,
            coordinate: Coordinate::new(52.52, 13.40),
            fill_level: fill,
            battery_level: battery,
            noise_level: None,
            last_seen: None,
        }
    }

    #[test]
    fn test_coordinate_osrm_order() {
        let c = Coordinate::new(52.5, 13.4);
        assert_eq!(c.to_osrm(), "13.4,52.5");
    }

    #[test]
    fn test_coordinate_parse() {
        let c: Coordinate = "52.52, 13.405".parse().unwrap();
        assert_eq!(c, Coordinate::new(52.52, 13.405));
        assert!("52.52".parse::<Coordinate>().is_err());
        assert!("95.0,13.4".parse::<Coordinate>().is_err());
        assert!("abc,13.4".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_needs_collection() {
        assert!(bin("a", Some(80.0), None).needs_collection(75.0));
        assert!(bin("a", Some(75.0), None).needs_collection(75.0));
        assert!(!bin("a", Some(74.9), None).needs_collection(75.0));
        assert!(!bin("a", None, None).needs_collection(0.0));
    }

    #[test]
    fn test_battery_low() {
        assert!(bin("a", None, Some(10.0)).battery_low(20.0));
        assert!(!bin("a", None, Some(20.0)).battery_low(20.0));
        assert!(!bin("a", None, None).battery_low(20.0));
    }

    #[test]
    fn test_select_for_collection_keeps_order() {
        let bins = vec![
            bin("c", Some(90.0), None),
            bin("a", Some(10.0), None),
            bin("b", Some(76.0), None),
        ];
        let stops = select_for_collection(&bins, 75.0);
        let ids: Vec<&str> = stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_trashbin_from_backend_json() {
        let json = r#"{
            "id": "bin-7",
            "name": "Market Square",
            "coordinate": {"lat": 48.1, "lon": 11.5},
            "fillLevel": 63.0,
            "batteryLevel": 88,
            "lastSeen": "2024-03-01T10:15:00Z"
        }"#;
        let bin: Trashbin = serde_json::from_str(json).unwrap();
        assert_eq!(bin.label(), "Market Square");
        assert_eq!(bin.fill_level, Some(63.0));
        assert_eq!(bin.battery_level, Some(88.0));
        assert!(bin.noise_level.is_none());
        assert!(bin.last_seen.is_some());
    }
}
