use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::trace;

use crate::core::FrameTick;
use crate::error::ChartResult;

use super::{FrameCallback, HostTimeline, Subscription, SubscriptionId};

type SharedCallback = Rc<RefCell<FrameCallback>>;

#[derive(Default)]
struct TimelineInner {
    tick: FrameTick,
    next_id: u64,
    callbacks: IndexMap<SubscriptionId, SharedCallback>,
    stale: Vec<SharedCallback>,
    keep_stale: bool,
    frames_dispatched: u64,
}

/// Deterministic host timeline driven by explicit `advance` calls.
///
/// Callbacks run in subscription order on the caller's thread. The
/// subscriber list is snapshotted per frame, so callbacks may cancel any
/// subscription (their own included) while a frame is being dispatched.
#[derive(Clone, Default)]
pub struct ManualTimeline {
    inner: Rc<RefCell<TimelineInner>>,
}

impl ManualTimeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps invoking callbacks after their subscription is cancelled,
    /// mimicking a host that holds on to stale references.
    pub fn keep_stale_callbacks(&self, keep: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.keep_stale = keep;
        if !keep {
            inner.stale.clear();
        }
    }

    /// Dispatches one frame `delta` ms after the previous one.
    pub fn advance(&self, delta: f64) -> ChartResult<()> {
        let time = self.inner.borrow().tick.time + delta;
        self.dispatch(FrameTick::new(time, delta))
    }

    /// Dispatches one frame at absolute `time` ms.
    pub fn tick_at(&self, time: f64) -> ChartResult<()> {
        let delta = time - self.inner.borrow().tick.time;
        self.dispatch(FrameTick::new(time, delta))
    }

    /// Dispatches `count` frames of `delta` ms each, stopping at the first error.
    pub fn run_frames(&self, count: usize, delta: f64) -> ChartResult<()> {
        for _ in 0..count {
            self.advance(delta)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    #[must_use]
    pub fn frames_dispatched(&self) -> u64 {
        self.inner.borrow().frames_dispatched
    }

    fn dispatch(&self, tick: FrameTick) -> ChartResult<()> {
        tick.validate()?;

        let (live, stale) = {
            let mut inner = self.inner.borrow_mut();
            inner.tick = tick;
            inner.frames_dispatched += 1;
            let live: Vec<(SubscriptionId, SharedCallback)> = inner
                .callbacks
                .iter()
                .map(|(id, callback)| (*id, callback.clone()))
                .collect();
            (live, inner.stale.clone())
        };
        trace!(
            time = tick.time,
            delta = tick.delta,
            subscribers = live.len(),
            stale = stale.len(),
            "dispatching host frame"
        );

        for (id, callback) in live {
            if !self.inner.borrow().callbacks.contains_key(&id) {
                continue;
            }
            invoke(&callback, tick)?;
        }
        for callback in stale {
            invoke(&callback, tick)?;
        }
        Ok(())
    }
}

fn invoke(callback: &SharedCallback, tick: FrameTick) -> ChartResult<()> {
    // A callback re-entering the timeline is skipped rather than aliased.
    let Ok(mut callback) = callback.try_borrow_mut() else {
        return Ok(());
    };
    (callback)(tick)
}

impl HostTimeline for ManualTimeline {
    fn add_frame_callback(&self, callback: FrameCallback) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = SubscriptionId(inner.next_id);
            inner.next_id += 1;
            inner.callbacks.insert(id, Rc::new(RefCell::new(callback)));
            id
        };

        let weak: Weak<RefCell<TimelineInner>> = Rc::downgrade(&self.inner);
        Subscription::new(id, move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let removed = {
                let mut inner = shared.borrow_mut();
                match inner.callbacks.shift_remove(&id) {
                    Some(callback) if inner.keep_stale => {
                        inner.stale.push(callback);
                        None
                    }
                    removed => removed,
                }
            };
            // Dropped outside the borrow: the callback may own other subscriptions.
            drop(removed);
        })
    }

    fn current_tick(&self) -> FrameTick {
        self.inner.borrow().tick
    }
}

impl std::fmt::Debug for ManualTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualTimeline")
            .field("tick", &inner.tick)
            .field("subscribers", &inner.callbacks.len())
            .field("stale", &inner.stale.len())
            .finish()
    }
}
