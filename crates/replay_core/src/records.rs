//! Record types for the four replay datasets.
//!
//! All records are immutable after load. The serde shapes mirror the wire
//! format emitted by the simulation pipeline; numeric fields that the
//! upstream solver can leave as `NaN` arrive here as `null` after lexical
//! repair (see [crate::repair]) and are modelled as `Option`s.

use serde::Deserialize;
use serde::de::{self, Deserializer};

/// One (longitude, latitude, elevation) vertex of a trip path.
/// Components may individually be `null` where the upstream solver emitted
/// `NaN` for an unroutable point.
pub type Waypoint = Vec<Option<f64>>;

/// Screening hook applied to every record as it leaves the loader.
///
/// Returning `Some(reason)` rejects the record before it can reach the query
/// layer; malformed records would otherwise produce silently wrong temporal
/// results.
pub trait DatasetRecord {
    fn reject_reason(&self) -> Option<String> {
        None
    }
}

/// A vehicle path: waypoints with a parallel timestamp sequence and an
/// occupancy flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripRecord {
    pub trip: Vec<Waypoint>,
    pub timestamp: Vec<f64>,
    #[serde(default)]
    pub board: i64,
}

/// Occupancy classification of a trip, derived from its `board` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripPhase {
    /// A passenger is on board.
    Occupied,
    /// The vehicle is driving empty toward a pickup.
    Dispatched,
}

impl TripRecord {
    pub fn phase(&self) -> TripPhase {
        if self.board == 1 {
            TripPhase::Occupied
        } else {
            TripPhase::Dispatched
        }
    }

    /// Number of waypoints with at least one repaired-null component.
    pub fn null_waypoint_count(&self) -> usize {
        self.trip
            .iter()
            .filter(|point| point.iter().any(Option::is_none))
            .count()
    }
}

impl DatasetRecord for TripRecord {
    fn reject_reason(&self) -> Option<String> {
        if self.trip.len() != self.timestamp.len() {
            return Some(format!(
                "waypoint/timestamp length mismatch ({} vs {})",
                self.trip.len(),
                self.timestamp.len()
            ));
        }
        if self.timestamp.windows(2).any(|pair| pair[0] > pair[1]) {
            return Some("timestamps are not non-decreasing".to_string());
        }
        None
    }
}

/// Presence of a vehicle or passenger marker during a closed time window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerRecord {
    pub location: Vec<f64>,
    /// Validity interval `[start, end]`, inclusive on both ends.
    pub timestamp: [f64; 2],
}

impl MarkerRecord {
    pub fn start(&self) -> f64 {
        self.timestamp[0]
    }

    pub fn end(&self) -> f64 {
        self.timestamp[1]
    }
}

impl DatasetRecord for MarkerRecord {
    fn reject_reason(&self) -> Option<String> {
        if self.start() > self.end() {
            return Some(format!(
                "inverted validity interval [{}, {}]",
                self.start(),
                self.end()
            ));
        }
        if self.location.len() < 2 {
            return Some(format!(
                "location needs at least a coordinate pair, got {} components",
                self.location.len()
            ));
        }
        None
    }
}

/// Aggregate fleet counters for one discrete simulated minute.
///
/// The dataset is sparse (minutes may be missing) and every counter is
/// defaultable; callers receiving no record for a minute show zeros.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRecord {
    /// Simulated minute this record describes. The pipeline sometimes writes
    /// the value as a quoted string, so it is compared as a number.
    #[serde(deserialize_with = "numeric_field")]
    pub time: f64,
    #[serde(default)]
    pub driving_vehicle_num: u64,
    #[serde(default)]
    pub empty_vehicle_num: u64,
    #[serde(default)]
    pub waiting_passenger_num: u64,
    #[serde(default)]
    pub average_waiting_time: Option<f64>,
    #[serde(default, rename = "fail_passenger_cumNum")]
    pub fail_passenger_cum: u64,
}

impl ResultRecord {
    /// Vehicles in service at this minute, driving and idle combined.
    pub fn total_vehicle_num(&self) -> u64 {
        self.driving_vehicle_num + self.empty_vehicle_num
    }
}

impl DatasetRecord for ResultRecord {}

/// Accepts a JSON number or a numeric string for fields the pipeline writes
/// inconsistently.
fn numeric_field<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("not a numeric value: {text:?}"))),
    }
}

/// The four datasets a replay session runs against. Built once at startup and
/// only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationDataset {
    pub trips: Vec<TripRecord>,
    pub vehicle_markers: Vec<MarkerRecord>,
    pub passenger_markers: Vec<MarkerRecord>,
    pub results: Vec<ResultRecord>,
}
