//! Replay a small embedded dataset headlessly and print per-frame views.
//!
//! Run with: cargo run -p replay_core --example replay_run

use std::sync::Arc;

use replay_core::playback::ManualScheduler;
use replay_core::provider::StaticDatasetProvider;
use replay_core::session::ReplaySession;

const TRIP_JSON: &str = r#"[
    {"trip": [[127.10, 37.40, 0.0], [127.12, 37.42, 0.0], [127.14, 37.43, 0.0]],
     "timestamp": [1380.0, 1385.0, 1392.0], "board": 1},
    {"trip": [[127.20, 37.45, 0.0], [NaN, NaN, 0.0], [127.16, 37.41, 0.0]],
     "timestamp": [1388.0, 1395.0, 1403.0], "board": 0}
]"#;

const VEHICLE_MARKER_JSON: &str = r#"[
    {"location": [127.11, 37.41], "timestamp": [1380.0, 1420.0]},
    {"location": [127.18, 37.44], "timestamp": [1400.0, 1560.0]}
]"#;

const PASSENGER_MARKER_JSON: &str = r#"[
    {"location": [127.13, 37.42], "timestamp": [1385.0, 1401.0]}
]"#;

const RESULT_JSON: &str = r#"[
    {"time": 1380, "driving_vehicle_num": 1, "empty_vehicle_num": 1,
     "waiting_passenger_num": 0, "average_waiting_time": 0.0, "fail_passenger_cumNum": 0},
    {"time": 1400, "driving_vehicle_num": 2, "empty_vehicle_num": 0,
     "waiting_passenger_num": 1, "average_waiting_time": 2.5, "fail_passenger_cumNum": 0}
]"#;

const SIM_CONFIG_JSON: &str = r#"{"TIME_RANGE_START": 1380, "TIME_RANGE_END": 1560}"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("replay_core=debug")),
        )
        .init();

    const FRAMES: usize = 8;
    // One simulated minute per frame keeps the demo output readable.
    const RATE: f64 = 1.0;

    let provider = StaticDatasetProvider::new()
        .with("trip", TRIP_JSON)
        .with("vehicle_marker", VEHICLE_MARKER_JSON)
        .with("passenger_marker", PASSENGER_MARKER_JSON)
        .with("result", RESULT_JSON)
        .with("sim_config", SIM_CONFIG_JSON);

    let mut session = ReplaySession::bootstrap(&provider, RATE);
    let bounds = session.bounds();
    println!(
        "--- Replay session ({} trips, bounds {} .. {}) ---",
        session.dataset().trips.len(),
        bounds.min,
        bounds.max
    );
    for trip in &session.dataset().trips {
        println!(
            "  trip: {} waypoints, phase {:?}, repaired nulls {}",
            trip.trip.len(),
            trip.phase(),
            trip.null_waypoint_count()
        );
    }

    let scheduler = Arc::new(ManualScheduler::new());
    session.start_playback(scheduler.clone());

    for _ in 0..FRAMES {
        scheduler.run_next();
        let view = session.frame();
        let occupancy = view
            .result
            .map(|r| (r.total_vehicle_num(), r.waiting_passenger_num))
            .unwrap_or((0, 0));
        println!(
            "TIME {} ({:7.2} min)  vehicles drawn: {}  passengers drawn: {}  in service: {}  waiting: {}",
            view.label,
            view.time,
            view.vehicle_markers.len(),
            view.passenger_markers.len(),
            occupancy.0,
            occupancy.1,
        );
    }

    // Scrub to the middle of the window, the way the slider would.
    session.seek(1400.9);
    let view = session.frame();
    println!(
        "after scrub to 1400.9 -> TIME {}  vehicles drawn: {}  in service: {}",
        view.label,
        view.vehicle_markers.len(),
        view.result.map(|r| r.total_vehicle_num()).unwrap_or(0),
    );

    session.stop_playback();
    println!("playback stopped, pending frames: {}", scheduler.pending_count());
}
