//! Traffic counting stations and the simulated transport-density reading.
//!
//! Station records come from a JSON dataset shaped `{ "rows": [ ... ] }`.
//! Each row carries hourly vehicle counts under `hour_00` … `hour_23`
//! alongside descriptive fields. Datasets list some stations more than
//! once; [`unique_stations`] collapses them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{clock, traffic};
use crate::error::{ClockError, LoadError};

/// Station identifier. Datasets use both strings and integers for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawStationId")]
pub struct StationId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStationId {
    Text(String),
    Number(i64),
}

impl From<RawStationId> for StationId {
    fn from(raw: RawStationId) -> Self {
        match raw {
            RawStationId::Text(s) => StationId(s),
            RawStationId::Number(n) => StationId(n.to_string()),
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One traffic counting station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficStation {
    pub station_id: StationId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub road_name: Option<String>,
    #[serde(default)]
    pub intersection: Option<String>,
    /// Vehicles per day.
    #[serde(default)]
    pub daily_total: Option<f64>,
    #[serde(default)]
    pub wgs84_latitude: Option<f64>,
    #[serde(default)]
    pub wgs84_longitude: Option<f64>,
    /// Remaining columns, including the `hour_XX` counts.
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl TrafficStation {
    /// Vehicle count for `hour`, if the row has a numeric value for it.
    pub fn count_at(&self, hour: u8) -> Option<f64> {
        match self.columns.get(&hour_key(hour))? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// All 24 hourly counts, midnight first.
    pub fn hourly_counts(&self) -> [Option<f64>; 24] {
        std::array::from_fn(|hour| self.count_at(hour as u8))
    }

    /// `(latitude, longitude)` when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.wgs84_latitude?, self.wgs84_longitude?))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Station")
    }
}

fn hour_key(hour: u8) -> String {
    format!("hour_{hour:02}")
}

/// Top-level dataset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficDataset {
    pub rows: Vec<TrafficStation>,
}

impl TrafficDataset {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Rows de-duplicated by station id.
    pub fn unique_stations(self) -> Vec<TrafficStation> {
        unique_stations(self.rows)
    }
}

/// De-duplicate by `station_id`. A station keeps the position of its first
/// occurrence and the data of its last.
pub fn unique_stations(rows: Vec<TrafficStation>) -> Vec<TrafficStation> {
    let mut slots: HashMap<StationId, usize> = HashMap::new();
    let mut unique: Vec<TrafficStation> = Vec::with_capacity(rows.len());
    for row in rows {
        match slots.get(&row.station_id).copied() {
            Some(slot) => unique[slot] = row,
            None => {
                slots.insert(row.station_id.clone(), unique.len());
                unique.push(row);
            }
        }
    }
    unique
}

/// Inclusive latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Greater Sydney.
pub const SYDNEY_BOUNDS: GeoBounds = GeoBounds {
    south: -34.2,
    west: 150.8,
    north: -33.5,
    east: 151.5,
};

impl GeoBounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.south..=self.north).contains(&latitude) && (self.west..=self.east).contains(&longitude)
    }

    /// South edge below north edge, west edge left of east edge.
    pub fn is_well_formed(&self) -> bool {
        self.south <= self.north && self.west <= self.east
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        SYDNEY_BOUNDS
    }
}

/// Stations with coordinates inside `bounds`.
pub fn within_bounds<'a>(
    stations: &'a [TrafficStation],
    bounds: &'a GeoBounds,
) -> impl Iterator<Item = &'a TrafficStation> + 'a {
    stations.iter().filter(move |s| {
        s.position()
            .is_some_and(|(lat, lon)| bounds.contains(lat, lon))
    })
}

/// Simulated transport density for `hour`.
///
/// With a station selected: its hourly count plus uniform noise, floored at
/// zero; a missing count reads as zero. Without one: a whole number drawn
/// from `[0, 100)`.
pub fn transport_density(
    station: Option<&TrafficStation>,
    hour: u8,
    rng: &mut impl Rng,
) -> Result<f64, ClockError> {
    if hour > clock::LAST_HOUR {
        return Err(ClockError::Hour(hour));
    }
    let value = match station {
        Some(station) => match station.count_at(hour) {
            Some(count) => {
                let noise = rng.gen_range(-traffic::NOISE_AMPLITUDE..traffic::NOISE_AMPLITUDE);
                (count + noise).max(0.0)
            }
            None => 0.0,
        },
        None => rng.gen_range(0.0..traffic::UNSELECTED_CEILING).floor(),
    };
    Ok(value)
}
