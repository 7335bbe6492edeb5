#![allow(dead_code)]

use replay_core::provider::{DatasetProvider, FetchError, StaticDatasetProvider};

pub const SIM_CONFIG_JSON: &str = r#"{"TIME_RANGE_START": 1380, "TIME_RANGE_END": 1560}"#;

pub const TRIP_JSON: &str = r#"[
    {"trip": [[127.10, 37.40, 0.0], [127.12, 37.42, 0.0]],
     "timestamp": [1380.0, 1390.0], "board": 1},
    {"trip": [[127.20, 37.45, 0.0], [NaN, NaN, 0.0]],
     "timestamp": [1400.0, 1410.0], "board": 0}
]"#;

pub const VEHICLE_MARKER_JSON: &str = r#"[
    {"location": [127.11, 37.41], "timestamp": [1380.0, 1380.0]},
    {"location": [127.18, 37.44], "timestamp": [1400.0, 1560.0]}
]"#;

pub const PASSENGER_MARKER_JSON: &str = r#"[
    {"location": [127.13, 37.42], "timestamp": [1385.0, 1401.0]}
]"#;

pub const RESULT_JSON: &str = r#"[
    {"time": 1400, "driving_vehicle_num": 3, "empty_vehicle_num": 2,
     "waiting_passenger_num": 0, "average_waiting_time": 0,
     "fail_passenger_cumNum": 0}
]"#;

/// Provider with every dataset and the config document registered.
pub fn full_provider() -> StaticDatasetProvider {
    StaticDatasetProvider::new()
        .with("sim_config", SIM_CONFIG_JSON)
        .with("trip", TRIP_JSON)
        .with("vehicle_marker", VEHICLE_MARKER_JSON)
        .with("passenger_marker", PASSENGER_MARKER_JSON)
        .with("result", RESULT_JSON)
}

/// Provider whose every fetch fails with a server error.
pub struct FailingProvider;

impl DatasetProvider for FailingProvider {
    fn fetch(&self, _resource: &str) -> Result<String, FetchError> {
        Err(FetchError::Status(503))
    }
}
