mod support;

use std::sync::Arc;

use replay_core::playback::ManualScheduler;
use replay_core::session::ReplaySession;

use support::full_provider;

#[test]
fn playback_advances_one_rate_step_per_frame() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut session = ReplaySession::bootstrap(&full_provider(), 0.25);
    session.start_playback(scheduler.clone());

    for frame in 1..=8 {
        assert!(scheduler.run_next());
        assert_eq!(session.current_time(), 1380.0 + 0.25 * frame as f64);
    }
    session.stop_playback();
}

#[test]
fn playback_wraps_at_the_maximum_bound() {
    let scheduler = Arc::new(ManualScheduler::new());
    // 30 minutes per frame: six frames reach the maximum, the seventh wraps.
    let mut session = ReplaySession::bootstrap(&full_provider(), 30.0);
    session.start_playback(scheduler.clone());

    for _ in 0..6 {
        assert!(scheduler.run_next());
    }
    assert_eq!(session.current_time(), 1560.0);

    assert!(scheduler.run_next());
    assert_eq!(session.current_time(), 1380.0);
    session.stop_playback();
}

#[test]
fn scrub_during_playback_feeds_the_next_frame() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut session = ReplaySession::bootstrap(&full_provider(), 0.25);
    session.start_playback(scheduler.clone());

    assert!(scheduler.run_next());
    session.seek(1450.0);
    assert!(scheduler.run_next());
    assert_eq!(session.current_time(), 1450.25);
    session.stop_playback();
}

#[test]
fn teardown_cancels_the_pending_frame() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut session = ReplaySession::bootstrap(&full_provider(), 0.25);
    session.start_playback(scheduler.clone());
    assert_eq!(scheduler.pending_count(), 1);

    session.stop_playback();
    assert_eq!(scheduler.pending_count(), 0);
    assert!(!scheduler.run_next());
}

#[test]
fn dropping_a_playing_session_leaves_no_live_chain() {
    let scheduler = Arc::new(ManualScheduler::new());
    {
        let mut session = ReplaySession::bootstrap(&full_provider(), 0.25);
        session.start_playback(scheduler.clone());
        assert_eq!(scheduler.pending_count(), 1);
    }
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn frame_views_stay_consistent_while_frames_fire() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut session = ReplaySession::bootstrap(&full_provider(), 10.0);
    session.start_playback(scheduler.clone());

    // 1380 -> 1390 -> 1400: the marker valid only at 1380 must disappear and
    // the minute-1400 aggregates appear, each against the frame's own time.
    let view = session.frame();
    assert_eq!(view.time, 1380.0);
    assert_eq!(view.vehicle_markers.len(), 1);

    assert!(scheduler.run_next());
    assert!(scheduler.run_next());
    let view = session.frame();
    assert_eq!(view.time, 1400.0);
    assert_eq!(view.vehicle_markers.len(), 1); // the long-lived marker only
    assert_eq!(view.vehicle_markers[0], &[127.18, 37.44][..]);
    assert_eq!(view.result.map(|r| r.driving_vehicle_num), Some(3));
    session.stop_playback();
}
