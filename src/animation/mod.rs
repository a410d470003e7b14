//! Chart-engine animation internals: clips, their arena, and the driver that
//! advances them.
//!
//! The driver's timing is a pluggable [`DriverAdvance`] strategy. Engines
//! start with [`NativeTimer`]; `crate::clock` swaps in a host-driven one.

mod arena;
mod clip;
mod driver;
mod events;

pub use arena::ClipArena;
pub use clip::{Clip, ClipId, FnClip};
pub use driver::{AdvanceReport, DriverAdvance, DriverCore, DriverKind, NativeTimer, Stage};
pub use events::{AnimationEvent, AnimationListener};

use tracing::debug;

use crate::core::FrameTick;
use crate::error::{ChartError, ChartResult};

/// Animation driver owned by one chart handle.
pub struct Animation {
    core: DriverCore,
    driver: Box<dyn DriverAdvance>,
    disposed: bool,
}

impl Animation {
    /// Creates a stopped driver backed by the engine's native timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: DriverCore::default(),
            driver: Box::new(NativeTimer::new()),
            disposed: false,
        }
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.core.set_stage(stage);
        self
    }

    /// Starts the timing loop through the current strategy.
    pub fn start(&mut self) {
        if self.disposed {
            return;
        }
        self.driver.start_loop(&mut self.core);
    }

    pub fn pause(&mut self) {
        if self.core.paused {
            return;
        }
        self.core.paused = true;
        self.core.emit(AnimationEvent::Paused);
    }

    pub fn resume(&mut self) {
        if !self.core.paused {
            return;
        }
        self.core.paused = false;
        self.core.emit(AnimationEvent::Resumed);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.core.running
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.core.paused
    }

    /// Gives an autonomous timer the chance to run one frame.
    pub fn poll(&mut self) -> Option<AdvanceReport> {
        if self.disposed {
            return None;
        }
        self.driver.poll(&mut self.core)
    }

    /// Advances one frame at `tick` through the current strategy.
    pub fn advance(&mut self, tick: FrameTick, notify: bool) -> AdvanceReport {
        if self.disposed {
            return AdvanceReport::default();
        }
        self.driver.advance(&mut self.core, tick, notify)
    }

    pub fn add_clip(&mut self, clip: Box<dyn Clip>) -> ClipId {
        self.core.clips.insert(clip)
    }

    /// Removes a clip without running its destroy hook.
    pub fn remove_clip(&mut self, id: ClipId) -> bool {
        self.core.clips.remove(id).is_some()
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.core.clips.len()
    }

    #[must_use]
    pub fn clip_ids(&self) -> &[ClipId] {
        self.core.clips.ids()
    }

    #[must_use]
    pub fn has_clip(&self, id: ClipId) -> bool {
        self.core.clips.contains(id)
    }

    #[must_use]
    pub fn driver_kind(&self) -> DriverKind {
        self.driver.kind()
    }

    /// Installs a new timing strategy and returns the previous one.
    ///
    /// Dropping the returned strategy cancels whatever loop it had scheduled.
    /// Running/paused state and live clips carry over unchanged.
    pub fn replace_driver(&mut self, driver: Box<dyn DriverAdvance>) -> Box<dyn DriverAdvance> {
        debug!(
            from = ?self.driver.kind(),
            to = ?driver.kind(),
            "replacing animation driver"
        );
        std::mem::replace(&mut self.driver, driver)
    }

    /// Sets the per-frame hook invoked with `delta` on every notified frame.
    pub fn set_frame_hook(&mut self, hook: impl FnMut(f64) + 'static) {
        self.core.set_frame_hook(Box::new(hook));
    }

    pub fn set_stage(&mut self, stage: Box<dyn Stage>) {
        self.core.set_stage(stage);
    }

    #[must_use]
    pub fn has_stage(&self) -> bool {
        self.core.has_stage()
    }

    /// Registers a listener with a unique identifier.
    pub fn register_listener(&mut self, listener: Box<dyn AnimationListener>) -> ChartResult<()> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(ChartError::InvalidData(
                "animation listener id must not be empty".to_owned(),
            ));
        }
        if self
            .core
            .listeners
            .iter()
            .any(|entry| entry.id() == listener_id)
        {
            return Err(ChartError::InvalidData(format!(
                "animation listener with id `{listener_id}` is already registered"
            )));
        }
        self.core.listeners.push(listener);
        Ok(())
    }

    /// Unregisters a listener by id. Returns `true` when removed.
    pub fn unregister_listener(&mut self, listener_id: &str) -> bool {
        if let Some(position) = self
            .core
            .listeners
            .iter()
            .position(|entry| entry.id() == listener_id)
        {
            self.core.listeners.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.core.listeners.len()
    }

    /// Releases clips, hooks, listeners and stage. The running flag is left
    /// as-is; a disposed driver never advances again.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.core.release();
        self.disposed = true;
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("driver", &self.driver.kind())
            .field("core", &self.core)
            .field("disposed", &self.disposed)
            .finish()
    }
}
