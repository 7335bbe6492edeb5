//! The cooperative tick loop driving the playback clock.
//!
//! The host environment owns frame pacing: it exposes a "run this callback
//! before the next paint" primitive through [FrameScheduler]. Each fired
//! frame ticks the clock once and schedules the follow-up, forming a chain
//! that lives until the owning [PlaybackHandle] cancels it. Cancellation and
//! the check-then-schedule step synchronize on the pending-request slot, so
//! at most one live chain exists per handle and no tick can be scheduled
//! after cancellation is requested, even on a multi-threaded host.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::clock::PlaybackClock;

/// Callback to run before the next paint.
pub type FrameCallback = Box<dyn FnOnce() + Send>;

/// Identifier of a scheduled-but-not-yet-fired frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host-provided frame pacing primitive.
///
/// `request_frame` must only record the callback for a later frame, never
/// invoke it synchronously; the tick chain holds its scheduling lock across
/// the call. `cancel_frame` drops a pending callback; cancelling an already
/// fired request is a no-op.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest;
    fn cancel_frame(&self, request: FrameRequest);
}

struct TickChain {
    scheduler: Arc<dyn FrameScheduler>,
    clock: Arc<Mutex<PlaybackClock>>,
    cancelled: AtomicBool,
    pending: Mutex<Option<FrameRequest>>,
}

fn schedule_next(chain: &Arc<TickChain>) {
    let mut pending = match chain.pending.lock() {
        Ok(guard) => guard,
        Err(_) => return, // poisoned: a tick panicked, let the chain die
    };
    if chain.cancelled.load(Ordering::SeqCst) {
        return;
    }
    let hop = Arc::clone(chain);
    let request = chain
        .scheduler
        .request_frame(Box::new(move || run_tick(hop)));
    *pending = Some(request);
}

fn run_tick(chain: Arc<TickChain>) {
    if let Ok(mut pending) = chain.pending.lock() {
        // This frame has fired; its request id is no longer cancellable.
        *pending = None;
    }
    if chain.cancelled.load(Ordering::SeqCst) {
        return;
    }
    if let Ok(mut clock) = chain.clock.lock() {
        clock.tick();
    }
    schedule_next(&chain);
}

impl TickChain {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let request = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => None,
        };
        if let Some(request) = request {
            self.scheduler.cancel_frame(request);
        }
    }
}

/// Owner of one tick chain. Dropping the handle cancels the chain, so a torn
/// down view can never receive a stray tick.
pub struct PlaybackHandle {
    chain: Arc<TickChain>,
}

impl PlaybackHandle {
    /// Stops the chain: no further tick runs, and any pending frame request
    /// is withdrawn from the scheduler. Idempotent.
    pub fn cancel(&self) {
        self.chain.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.chain.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Starts a tick chain on `scheduler` advancing `clock` once per frame.
pub fn start_playback(
    scheduler: Arc<dyn FrameScheduler>,
    clock: Arc<Mutex<PlaybackClock>>,
) -> PlaybackHandle {
    let chain = Arc::new(TickChain {
        scheduler,
        clock,
        cancelled: AtomicBool::new(false),
        pending: Mutex::new(None),
    });
    schedule_next(&chain);
    PlaybackHandle { chain }
}

/// Deterministic scheduler for tests and headless hosts: callbacks queue up
/// until the driver pumps them with [ManualScheduler::run_next].
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<(FrameRequest, FrameCallback)>>,
    next_id: AtomicU64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the oldest pending callback. Returns `false` when none is
    /// queued.
    pub fn run_next(&self) -> bool {
        let entry = match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };
        match entry {
            Some((_, callback)) => {
                // Run outside the lock: the callback re-enters request_frame.
                callback();
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let request = FrameRequest(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back((request, callback));
        }
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.retain(|(queued, _)| *queued != request);
        }
    }
}
