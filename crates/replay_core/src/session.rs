//! Replay session: startup orchestration and per-frame views.
//!
//! A session resolves bounds, loads the four datasets, and owns the clock
//! plus an optional running tick chain. After bootstrap the datasets are
//! read-only; the only mutable state left in the system is the current
//! simulated time.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::clock::{clock_label, PlaybackClock};
use crate::config::{resolve_bounds, SimulationBounds};
use crate::loader::load_all;
use crate::playback::{start_playback, FrameScheduler, PlaybackHandle};
use crate::provider::DatasetProvider;
use crate::query::{active_locations, result_at};
use crate::records::{ResultRecord, SimulationDataset, TripRecord};

/// Everything a renderer needs for one frame, materialized against a single
/// snapshot of the clock so every layer of the frame agrees on the time.
#[derive(Debug)]
pub struct FrameView<'a> {
    /// The simulated time every query below was answered at.
    pub time: f64,
    /// Clock-face banner text for `time`.
    pub label: String,
    /// The full trip set; the trail renderer slices it by `time` itself.
    pub trips: &'a [TripRecord],
    /// Locations of vehicle markers active at `time`, in dataset order.
    pub vehicle_markers: Vec<&'a [f64]>,
    /// Locations of passenger markers active at `time`, in dataset order.
    pub passenger_markers: Vec<&'a [f64]>,
    /// Aggregate counters for the discretized minute of `time`, when the
    /// sparse result dataset has them.
    pub result: Option<&'a ResultRecord>,
}

pub struct ReplaySession {
    bounds: SimulationBounds,
    dataset: SimulationDataset,
    clock: Arc<Mutex<PlaybackClock>>,
    playback: Option<PlaybackHandle>,
}

impl ReplaySession {
    /// Resolves bounds and loads the datasets, each independently; a failed
    /// source shows up as an empty dataset, never as a failed bootstrap.
    /// The clock starts at `bounds.min`, advancing `rate` minutes per frame.
    pub fn bootstrap(provider: &dyn DatasetProvider, rate: f64) -> Self {
        let bounds = resolve_bounds(provider);
        let dataset = load_all(provider);

        let mut clock = PlaybackClock::new(rate);
        clock.initialize(bounds);
        debug!(
            min = bounds.min,
            max = bounds.max,
            rate, "replay session ready"
        );

        Self {
            bounds,
            dataset,
            clock: Arc::new(Mutex::new(clock)),
            playback: None,
        }
    }

    pub fn bounds(&self) -> SimulationBounds {
        self.bounds
    }

    pub fn dataset(&self) -> &SimulationDataset {
        &self.dataset
    }

    pub fn current_time(&self) -> f64 {
        match self.clock.lock() {
            Ok(clock) => clock.now(),
            Err(poisoned) => poisoned.into_inner().now(),
        }
    }

    /// Scrub: repositions the clock exactly at `value`. The range control
    /// driving this is already bounded to `[min, max]`.
    pub fn seek(&self, value: f64) {
        match self.clock.lock() {
            Ok(mut clock) => clock.seek(value),
            Err(poisoned) => poisoned.into_inner().seek(value),
        }
    }

    /// Materializes "what to draw now": snapshots the clock once, then
    /// answers every query of the frame against that snapshot.
    pub fn frame(&self) -> FrameView<'_> {
        let time = self.current_time();
        FrameView {
            time,
            label: clock_label(time),
            trips: &self.dataset.trips,
            vehicle_markers: active_locations(&self.dataset.vehicle_markers, time),
            passenger_markers: active_locations(&self.dataset.passenger_markers, time),
            result: result_at(&self.dataset.results, time),
        }
    }

    /// Starts the tick chain on the host's scheduler. A chain already
    /// running is cancelled first, so at most one live chain exists.
    pub fn start_playback(&mut self, scheduler: Arc<dyn FrameScheduler>) {
        if let Some(previous) = self.playback.take() {
            previous.cancel();
        }
        self.playback = Some(start_playback(scheduler, Arc::clone(&self.clock)));
    }

    /// Cancels the running tick chain, if any. Safe to call on teardown
    /// regardless of playback state.
    pub fn stop_playback(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.cancel();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .map_or(false, |handle| !handle.is_cancelled())
    }
}

impl Drop for ReplaySession {
    fn drop(&mut self) {
        self.stop_playback();
    }
}
