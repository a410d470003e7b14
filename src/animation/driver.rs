use std::time::Instant;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::FrameTick;

use super::{AnimationEvent, AnimationListener, ClipArena, ClipId};

/// Which timing strategy currently drives an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    /// The engine's own free-running timer.
    Native,
    /// Advanced only when a host supplies `(time, delta)`.
    External,
}

/// Rendering stage refreshed after every notified frame.
pub trait Stage {
    fn update(&mut self);
}

/// Outcome of one clip-sequence traversal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub stepped: usize,
    pub finished: SmallVec<[ClipId; 4]>,
    pub remaining: usize,
    pub notified: bool,
}

/// Timing strategy injected into an [`super::Animation`].
///
/// The engine ships [`NativeTimer`]; hosts that own the clock inject their own
/// implementation instead of letting the engine free-run.
pub trait DriverAdvance {
    fn kind(&self) -> DriverKind;

    /// Invoked by `Animation::start`.
    fn start_loop(&mut self, core: &mut DriverCore);

    /// Steps every live clip once at `tick`, then runs frame side effects
    /// when `notify` is set.
    fn advance(&mut self, core: &mut DriverCore, tick: FrameTick, notify: bool) -> AdvanceReport;

    /// Lets an autonomous timer fire if a frame is due. Externally driven
    /// strategies never advance here.
    fn poll(&mut self, _core: &mut DriverCore) -> Option<AdvanceReport> {
        None
    }
}

/// Driver state shared by every timing strategy.
#[derive(Default)]
pub struct DriverCore {
    pub(super) running: bool,
    pub(super) paused: bool,
    pub(super) clips: ClipArena,
    frame_hook: Option<Box<dyn FnMut(f64)>>,
    pub(super) listeners: Vec<Box<dyn AnimationListener>>,
    stage: Option<Box<dyn Stage>>,
}

impl DriverCore {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn mark_running(&mut self) {
        self.running = true;
    }

    pub(super) fn set_frame_hook(&mut self, hook: Box<dyn FnMut(f64)>) {
        self.frame_hook = Some(hook);
    }

    pub(super) fn set_stage(&mut self, stage: Box<dyn Stage>) {
        self.stage = Some(stage);
    }

    pub(super) fn has_stage(&self) -> bool {
        self.stage.is_some()
    }

    /// Steps the live clip sequence head to tail in a single pass.
    ///
    /// The next-generation order is built while stepping, so a finishing clip
    /// is unlinked without disturbing the walk. Each live clip is stepped at
    /// most once per call.
    pub fn step_clips(&mut self, tick: FrameTick) -> AdvanceReport {
        let current = self.clips.take_order();
        let mut next = Vec::with_capacity(current.len());
        let mut report = AdvanceReport::default();

        for id in current {
            let Some(clip) = self.clips.get_mut(id) else {
                continue;
            };
            report.stepped += 1;
            if !clip.step(tick.time, tick.delta) {
                next.push(id);
                continue;
            }
            if let Some(mut finished) = self.clips.take_slot(id) {
                finished.on_destroy();
            }
            report.finished.push(id);
        }

        report.remaining = next.len();
        self.clips.restore_order(next);
        trace!(
            time = tick.time,
            delta = tick.delta,
            stepped = report.stepped,
            finished = report.finished.len(),
            "stepped clip sequence"
        );
        report
    }

    /// Per-frame side effects: frame hook, `Frame` event, stage refresh.
    pub fn notify_frame(&mut self, delta: f64) {
        if let Some(hook) = self.frame_hook.as_mut() {
            hook(delta);
        }
        self.emit(AnimationEvent::Frame { delta });
        if let Some(stage) = self.stage.as_mut() {
            stage.update();
        }
    }

    pub(super) fn emit(&mut self, event: AnimationEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }

    pub(super) fn release(&mut self) {
        self.clips.clear();
        self.frame_hook = None;
        self.listeners.clear();
        self.stage = None;
    }
}

impl std::fmt::Debug for DriverCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverCore")
            .field("running", &self.running)
            .field("paused", &self.paused)
            .field("clips", &self.clips)
            .field("listeners", &self.listeners.len())
            .field("has_stage", &self.stage.is_some())
            .finish()
    }
}

/// The engine's built-in timer: once started it free-runs on the process
/// clock and fires whenever it is polled.
#[derive(Debug)]
pub struct NativeTimer {
    epoch: Instant,
    last_frame: Option<Instant>,
    loop_scheduled: bool,
}

impl NativeTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_frame: None,
            loop_scheduled: false,
        }
    }

    #[must_use]
    pub fn is_loop_scheduled(&self) -> bool {
        self.loop_scheduled
    }
}

impl Default for NativeTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverAdvance for NativeTimer {
    fn kind(&self) -> DriverKind {
        DriverKind::Native
    }

    fn start_loop(&mut self, core: &mut DriverCore) {
        core.mark_running();
        self.loop_scheduled = true;
        self.last_frame = None;
    }

    fn advance(&mut self, core: &mut DriverCore, tick: FrameTick, notify: bool) -> AdvanceReport {
        let mut report = core.step_clips(tick);
        if notify {
            core.notify_frame(tick.delta);
            report.notified = true;
        }
        report
    }

    fn poll(&mut self, core: &mut DriverCore) -> Option<AdvanceReport> {
        if !self.loop_scheduled || !core.running || core.paused {
            return None;
        }
        let now = Instant::now();
        let time = now.duration_since(self.epoch).as_secs_f64() * 1_000.0;
        let delta = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64() * 1_000.0);
        self.last_frame = Some(now);
        Some(self.advance(core, FrameTick::new(time, delta), true))
    }
}
