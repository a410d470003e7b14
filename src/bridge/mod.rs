//! Frame bridge: subscribes to a host timeline, advances the chart's
//! externally clocked animation on every frame, and fires a lower-frequency
//! update callback on a host-time interval.

mod interval;
mod schedule;

pub use interval::{LEGACY_SECONDS_THRESHOLD, UpdateInterval};
pub use schedule::{CallbackSchedule, UpdateCallback};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::clock::ClockOverride;
use crate::core::{FrameTick, Theme};
use crate::engine::{ChartEngine, ChartHandle};
use crate::error::{ChartError, ChartResult};
use crate::host::{HostTimeline, Subscription};
use crate::render::Canvas;

/// Hook run at the end of every active frame, after the update callback.
pub type FrameHook<H> = Box<dyn FnMut(&mut H) -> ChartResult<()>>;

/// `Uninitialized → Active → Disposed`; there is no way back from `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeState {
    Uninitialized,
    Active,
    Disposed,
}

/// Counters and schedule state for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    pub state: BridgeState,
    pub ticks_seen: u64,
    pub frames_advanced: u64,
    pub callbacks_fired: u64,
    /// `None` while no callback is registered or a frame is in progress.
    pub interval_millis: Option<f64>,
    pub accumulated_millis: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct BridgeStats {
    ticks_seen: u64,
    frames_advanced: u64,
    callbacks_fired: u64,
}

enum Lifecycle<H> {
    Uninitialized,
    Active(H),
    Disposed,
}

struct BridgeCore<H> {
    lifecycle: Lifecycle<H>,
    schedule: Option<CallbackSchedule<H>>,
    frame_hook: Option<FrameHook<H>>,
}

impl<H: ChartHandle> BridgeCore<H> {
    fn dispose(&mut self) {
        if let Lifecycle::Active(mut chart) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed)
        {
            chart.dispose();
        }
        self.lifecycle = Lifecycle::Disposed;
        self.schedule = None;
        self.frame_hook = None;
    }
}

struct Shared<H> {
    core: RefCell<BridgeCore<H>>,
    state: Cell<BridgeState>,
    stats: Cell<BridgeStats>,
    invoke_immediately: Cell<bool>,
    stop_requested: Cell<bool>,
    subscription: RefCell<Option<Subscription>>,
    pending_schedule: RefCell<Option<CallbackSchedule<H>>>,
}

/// Cheap, clonable handle to one bridge.
///
/// Every clone refers to the same bridge, so an update callback can hold a
/// clone and call [`FrameBridge::stop`] from inside the frame it runs in.
pub struct FrameBridge<H> {
    shared: Rc<Shared<H>>,
}

impl<H> Clone for FrameBridge<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<H: ChartHandle + 'static> Default for FrameBridge<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ChartHandle + 'static> FrameBridge<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                core: RefCell::new(BridgeCore {
                    lifecycle: Lifecycle::Uninitialized,
                    schedule: None,
                    frame_hook: None,
                }),
                state: Cell::new(BridgeState::Uninitialized),
                stats: Cell::new(BridgeStats::default()),
                invoke_immediately: Cell::new(false),
                stop_requested: Cell::new(false),
                subscription: RefCell::new(None),
                pending_schedule: RefCell::new(None),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.shared.state.get()
    }

    /// Registers (or replaces) the periodic update callback. A replacement
    /// starts from an empty accumulator.
    ///
    /// Registering from inside a running frame takes effect once that frame
    /// completes.
    pub fn register_callback(
        &self,
        callback: impl FnMut(&mut H) -> ChartResult<()> + 'static,
        interval: UpdateInterval,
    ) -> ChartResult<()> {
        self.ensure_not_disposed("register_callback")?;
        let schedule = CallbackSchedule::new(Box::new(callback), interval)?;
        match self.shared.core.try_borrow_mut() {
            Ok(mut core) => core.schedule = Some(schedule),
            Err(_) => *self.shared.pending_schedule.borrow_mut() = Some(schedule),
        }
        debug!(interval_ms = interval.as_millis(), "update callback registered");
        Ok(())
    }

    /// When set before `start`, the update callback runs once during `start`,
    /// before any frame arrives.
    pub fn set_invoke_immediately(&self, invoke: bool) {
        self.shared.invoke_immediately.set(invoke);
    }

    pub fn set_frame_hook(
        &self,
        hook: impl FnMut(&mut H) -> ChartResult<()> + 'static,
    ) -> ChartResult<()> {
        self.ensure_not_disposed("set_frame_hook")?;
        let mut core = self.shared.core.try_borrow_mut().map_err(|_| {
            ChartError::InvalidLifecycle {
                operation: "set_frame_hook",
                state: self.state(),
            }
        })?;
        core.frame_hook = Some(Box::new(hook));
        Ok(())
    }

    #[must_use]
    pub fn has_frame_hook(&self) -> bool {
        self.shared
            .core
            .try_borrow()
            .is_ok_and(|core| core.frame_hook.is_some())
    }

    /// Creates the chart, installs the clock override and subscribes to
    /// `timeline`.
    pub fn start<E>(
        &self,
        engine: &mut E,
        surface: Canvas,
        theme: &Theme,
        timeline: &dyn HostTimeline,
    ) -> ChartResult<()>
    where
        E: ChartEngine<Handle = H>,
    {
        self.start_with(engine, surface, theme, timeline, |_| Ok(()))
    }

    /// Like [`FrameBridge::start`], running `setup` on the fresh chart after
    /// the clock override is installed and before the first frame.
    ///
    /// With invoke-immediately set, the update callback runs before the bridge
    /// subscribes to `timeline`. If initialization or that first callback
    /// fails, the chart is disposed, nothing stays subscribed, and the bridge
    /// is back to `Uninitialized`.
    pub fn start_with<E, F>(
        &self,
        engine: &mut E,
        surface: Canvas,
        theme: &Theme,
        timeline: &dyn HostTimeline,
        setup: F,
    ) -> ChartResult<()>
    where
        E: ChartEngine<Handle = H>,
        F: FnOnce(&mut H) -> ChartResult<()>,
    {
        let state = self.state();
        if state != BridgeState::Uninitialized {
            return Err(ChartError::InvalidLifecycle {
                operation: "start",
                state,
            });
        }
        theme.validate()?;

        let mut chart = engine.init(surface, theme)?;
        if let Err(err) = prepare_chart(&mut chart, setup) {
            chart.dispose();
            return Err(err);
        }

        {
            let mut core = self.shared.core.try_borrow_mut().map_err(|_| {
                ChartError::InvalidLifecycle {
                    operation: "start",
                    state,
                }
            })?;
            core.lifecycle = Lifecycle::Active(chart);
        }
        self.shared.state.set(BridgeState::Active);

        if self.shared.invoke_immediately.get() {
            if let Err(err) = self.invoke_now() {
                self.abandon_start();
                return Err(err);
            }
            self.settle();
            if self.state() != BridgeState::Active {
                debug!("frame bridge stopped during start");
                return Ok(());
            }
        }

        let weak = Rc::downgrade(&self.shared);
        let subscription = timeline.add_frame_callback(Box::new(move |tick| {
            match weak.upgrade() {
                Some(shared) => FrameBridge { shared }.on_tick(tick),
                None => Ok(()),
            }
        }));
        debug!(subscription = ?subscription.id(), "frame bridge started");
        *self.shared.subscription.borrow_mut() = Some(subscription);
        Ok(())
    }

    /// Handles one host frame: advance the chart's clips, accumulate `delta`,
    /// and fire the update callback when due.
    ///
    /// Frames reaching a bridge that is not active (including stale
    /// deliveries after `stop`) are ignored.
    pub fn on_tick(&self, tick: FrameTick) -> ChartResult<()> {
        if self.shared.stop_requested.get() || self.state() != BridgeState::Active {
            trace!(time = tick.time, "ignoring frame for inactive bridge");
            return Ok(());
        }
        tick.validate()?;

        let result = {
            let Ok(mut core) = self.shared.core.try_borrow_mut() else {
                debug!(time = tick.time, "ignoring re-entrant frame");
                return Ok(());
            };
            self.run_tick(&mut core, tick)
        };
        self.settle();
        result
    }

    /// Unsubscribes from the timeline and disposes the chart.
    ///
    /// A no-op before `start` and after a previous `stop`. Called from inside
    /// a frame callback, disposal happens as soon as the callback returns and
    /// nothing else runs for that frame.
    pub fn stop(&self) {
        if self.state() != BridgeState::Active {
            debug!(state = ?self.state(), "stop ignored");
            return;
        }
        self.shared.stop_requested.set(true);
        let subscription = self.shared.subscription.borrow_mut().take();
        if let Some(mut subscription) = subscription {
            subscription.cancel();
        }
        if !self.dispose_now() {
            debug!("stop requested mid-frame; disposing when the frame unwinds");
        }
    }

    /// Runs `f` on the live chart. Returns `None` unless the bridge is active
    /// and not inside a frame.
    pub fn with_chart<R>(&self, f: impl FnOnce(&mut H) -> R) -> Option<R> {
        let mut core = self.shared.core.try_borrow_mut().ok()?;
        match &mut core.lifecycle {
            Lifecycle::Active(chart) => Some(f(chart)),
            _ => None,
        }
    }

    #[must_use]
    pub fn interval_millis(&self) -> Option<f64> {
        let core = self.shared.core.try_borrow().ok()?;
        core.schedule.as_ref().map(CallbackSchedule::interval_millis)
    }

    #[must_use]
    pub fn accumulated_millis(&self) -> Option<f64> {
        let core = self.shared.core.try_borrow().ok()?;
        core.schedule
            .as_ref()
            .map(CallbackSchedule::accumulated_millis)
    }

    #[must_use]
    pub fn snapshot(&self) -> BridgeSnapshot {
        let stats = self.shared.stats.get();
        BridgeSnapshot {
            state: self.state(),
            ticks_seen: stats.ticks_seen,
            frames_advanced: stats.frames_advanced,
            callbacks_fired: stats.callbacks_fired,
            interval_millis: self.interval_millis(),
            accumulated_millis: self.accumulated_millis(),
        }
    }

    fn run_tick(&self, core: &mut BridgeCore<H>, tick: FrameTick) -> ChartResult<()> {
        let BridgeCore {
            lifecycle,
            schedule,
            frame_hook,
        } = core;
        let Lifecycle::Active(chart) = lifecycle else {
            return Ok(());
        };
        let mut stats = self.shared.stats.get();
        stats.ticks_seen += 1;

        // Advance first so the callback observes post-advance animation state.
        if let Some(animation) = chart.animation_mut() {
            if animation.is_running() && !animation.is_paused() {
                let report = ClockOverride::advance(animation, tick, true)?;
                stats.frames_advanced += 1;
                trace!(
                    time = tick.time,
                    stepped = report.stepped,
                    remaining = report.remaining,
                    "advanced chart animation"
                );
            }
        }
        self.shared.stats.set(stats);

        if let Some(schedule) = schedule.as_mut() {
            if schedule.accumulate(tick.delta) {
                schedule.fire(chart)?;
                stats.callbacks_fired += 1;
                self.shared.stats.set(stats);
                trace!(time = tick.time, "update callback fired");
            }
        }

        if self.shared.stop_requested.get() {
            return Ok(());
        }
        if let Some(hook) = frame_hook.as_mut() {
            hook(chart)?;
        }
        Ok(())
    }

    fn invoke_now(&self) -> ChartResult<()> {
        let mut core = self.shared.core.try_borrow_mut().map_err(|_| {
            ChartError::InvalidLifecycle {
                operation: "update_now",
                state: self.state(),
            }
        })?;
        let BridgeCore {
            lifecycle,
            schedule,
            ..
        } = &mut *core;
        if let (Lifecycle::Active(chart), Some(schedule)) = (lifecycle, schedule.as_mut()) {
            debug!("invoking update callback before the first frame");
            schedule.invoke(chart)?;
            let mut stats = self.shared.stats.get();
            stats.callbacks_fired += 1;
            self.shared.stats.set(stats);
        }
        Ok(())
    }

    /// Applies work deferred while a frame held the core: queued callback
    /// registrations and stop requests.
    fn settle(&self) {
        let pending = self.shared.pending_schedule.borrow_mut().take();
        if let Some(schedule) = pending {
            match self.shared.core.try_borrow_mut() {
                Ok(mut core) => core.schedule = Some(schedule),
                Err(_) => *self.shared.pending_schedule.borrow_mut() = Some(schedule),
            }
        }
        if self.shared.stop_requested.get() && self.state() == BridgeState::Active {
            self.dispose_now();
        }
    }

    /// Rolls a failed `start` back to `Uninitialized`, unless the failing
    /// callback already stopped the bridge.
    fn abandon_start(&self) {
        self.settle();
        if self.state() != BridgeState::Active {
            return;
        }
        if let Ok(mut core) = self.shared.core.try_borrow_mut() {
            if let Lifecycle::Active(mut chart) =
                std::mem::replace(&mut core.lifecycle, Lifecycle::Uninitialized)
            {
                chart.dispose();
            }
        }
        self.shared.state.set(BridgeState::Uninitialized);
        debug!("frame bridge start rolled back");
    }

    fn dispose_now(&self) -> bool {
        let Ok(mut core) = self.shared.core.try_borrow_mut() else {
            return false;
        };
        core.dispose();
        drop(core);
        self.shared.pending_schedule.borrow_mut().take();
        self.shared.state.set(BridgeState::Disposed);
        let stats = self.shared.stats.get();
        debug!(
            ticks = stats.ticks_seen,
            callbacks = stats.callbacks_fired,
            "frame bridge disposed"
        );
        true
    }

    fn ensure_not_disposed(&self, operation: &'static str) -> ChartResult<()> {
        let state = self.state();
        if state == BridgeState::Disposed || self.shared.stop_requested.get() {
            return Err(ChartError::InvalidLifecycle { operation, state });
        }
        Ok(())
    }
}

fn prepare_chart<H, F>(chart: &mut H, setup: F) -> ChartResult<()>
where
    H: ChartHandle,
    F: FnOnce(&mut H) -> ChartResult<()>,
{
    ClockOverride::install(chart.animation_mut())?;
    if let Some(animation) = chart.animation_mut() {
        animation.start();
    }
    setup(chart)
}
