//! Dataset loading: fetch, repair, parse, and shape validation.
//!
//! Each of the four datasets loads independently; a fetch or parse failure
//! degrades that dataset to an empty record vector and never aborts its
//! siblings. Downstream query code therefore always receives a vector and
//! branches on emptiness, never on absence.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::provider::{DatasetProvider, FetchError};
use crate::records::{DatasetRecord, SimulationDataset};
use crate::repair::repair_nan_tokens;

/// Characters of an unparseable payload kept for the diagnostic log.
const FRAGMENT_LIMIT: usize = 200;

/// The fixed set of replay datasets, by wire resource name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetName {
    Trip,
    VehicleMarker,
    PassengerMarker,
    Result,
}

impl DatasetName {
    pub const ALL: [DatasetName; 4] = [
        DatasetName::Trip,
        DatasetName::VehicleMarker,
        DatasetName::PassengerMarker,
        DatasetName::Result,
    ];

    pub fn resource(self) -> &'static str {
        match self {
            DatasetName::Trip => "trip",
            DatasetName::VehicleMarker => "vehicle_marker",
            DatasetName::PassengerMarker => "passenger_marker",
            DatasetName::Result => "result",
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

/// Errors encountered while producing a structured payload for one dataset.
#[derive(Debug)]
pub enum LoadError {
    Fetch(DatasetName, FetchError),
    Parse {
        dataset: DatasetName,
        message: String,
        fragment: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch(dataset, err) => write!(f, "fetching '{dataset}': {err}"),
            LoadError::Parse {
                dataset,
                message,
                fragment,
            } => write!(f, "parsing '{dataset}': {message}; payload starts: {fragment}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Fetches a dataset, repairs `NaN` tokens, and parses the result.
pub fn load_raw(provider: &dyn DatasetProvider, name: DatasetName) -> Result<Value, LoadError> {
    let text = provider
        .fetch(name.resource())
        .map_err(|err| LoadError::Fetch(name, err))?;

    let repaired = repair_nan_tokens(&text);
    serde_json::from_str(&repaired).map_err(|err| LoadError::Parse {
        dataset: name,
        message: err.to_string(),
        fragment: repaired.chars().take(FRAGMENT_LIMIT).collect(),
    })
}

/// Shape validation: turns whatever the load produced into a record vector.
///
/// A JSON array deserializes element-wise; a load failure, `null`, or any
/// non-array document degrades to an empty vector. Elements that fail to
/// deserialize or violate their record invariants are skipped with a warning
/// count. Total over all inputs: never fails, never returns anything but a
/// vector.
pub fn records_from<T>(payload: Result<Value, LoadError>, name: DatasetName) -> Vec<T>
where
    T: DeserializeOwned + DatasetRecord,
{
    let document = match payload {
        Ok(document) => document,
        Err(err) => {
            warn!(dataset = name.resource(), "dataset load failed: {err}");
            return Vec::new();
        }
    };

    let Value::Array(elements) = document else {
        warn!(
            dataset = name.resource(),
            "expected an array payload, substituting an empty dataset"
        );
        return Vec::new();
    };

    let total = elements.len();
    let mut malformed = 0usize;
    let mut rejected = 0usize;
    let mut records = Vec::with_capacity(total);

    for element in elements {
        let record: T = match serde_json::from_value(element) {
            Ok(record) => record,
            Err(_) => {
                malformed += 1;
                continue;
            }
        };
        if let Some(reason) = record.reject_reason() {
            warn!(dataset = name.resource(), "rejecting record: {reason}");
            rejected += 1;
            continue;
        }
        records.push(record);
    }

    if malformed > 0 || rejected > 0 {
        warn!(
            dataset = name.resource(),
            malformed, rejected, "skipped {} of {} records", malformed + rejected, total
        );
    }
    records
}

/// Loads one dataset end to end, degrading every failure to an empty vector.
pub fn load_dataset<T>(provider: &dyn DatasetProvider, name: DatasetName) -> Vec<T>
where
    T: DeserializeOwned + DatasetRecord,
{
    records_from(load_raw(provider, name), name)
}

/// Loads all four datasets independently. No dataset's failure blocks
/// another's success; the worst outcome is an empty member.
pub fn load_all(provider: &dyn DatasetProvider) -> SimulationDataset {
    let dataset = SimulationDataset {
        trips: load_dataset(provider, DatasetName::Trip),
        vehicle_markers: load_dataset(provider, DatasetName::VehicleMarker),
        passenger_markers: load_dataset(provider, DatasetName::PassengerMarker),
        results: load_dataset(provider, DatasetName::Result),
    };

    debug!(
        trips = dataset.trips.len(),
        vehicle_markers = dataset.vehicle_markers.len(),
        passenger_markers = dataset.passenger_markers.len(),
        results = dataset.results.len(),
        "datasets loaded"
    );

    let repaired_trips: usize = dataset
        .trips
        .iter()
        .filter(|trip| trip.null_waypoint_count() > 0)
        .count();
    if repaired_trips > 0 {
        warn!(
            repaired_trips,
            "some trips contain repaired null coordinates"
        );
    }

    dataset
}
