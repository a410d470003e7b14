//! Clock override: detaches a chart engine's animation from its native timer
//! so it advances only on host-supplied frame ticks.

mod external;

pub use external::ExternalClock;

use tracing::debug;

use crate::animation::{AdvanceReport, Animation, DriverKind};
use crate::core::FrameTick;
use crate::error::{ChartError, ChartResult};
use crate::host::HostTimeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// The driver was already externally clocked; nothing changed.
    AlreadyInstalled,
}

/// Installs and drives the external clock on a chart's animation driver.
pub struct ClockOverride;

impl ClockOverride {
    /// Validates the driver and swaps in [`ExternalClock`].
    ///
    /// A missing or disposed driver is a configuration error: leaving the
    /// native timer in place would silently desynchronize the chart from the
    /// host timeline.
    pub fn install(animation: Option<&mut Animation>) -> ChartResult<InstallOutcome> {
        let animation = animation.ok_or(ChartError::MissingAnimationDriver)?;
        if animation.is_disposed() {
            return Err(ChartError::MalformedAnimationDriver(
                "animation driver was already disposed".to_owned(),
            ));
        }
        if animation.driver_kind() == DriverKind::External {
            debug!("clock override already installed");
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        Self::disable_auto_start(animation);
        debug!(
            running = animation.is_running(),
            clips = animation.clip_count(),
            "clock override installed"
        );
        Ok(InstallOutcome::Installed)
    }

    /// Replaces the start-loop behavior so that starting only marks the
    /// driver as running. Any loop the native timer scheduled is dropped with
    /// it. Idempotent.
    pub fn disable_auto_start(animation: &mut Animation) {
        if animation.driver_kind() == DriverKind::External {
            return;
        }
        drop(animation.replace_driver(Box::new(ExternalClock)));
    }

    /// Steps the clip sequence once at `tick`, then runs frame side effects
    /// when `notify` is set.
    pub fn advance(
        animation: &mut Animation,
        tick: FrameTick,
        notify: bool,
    ) -> ChartResult<AdvanceReport> {
        if animation.driver_kind() != DriverKind::External {
            return Err(ChartError::MalformedAnimationDriver(
                "clock override is not installed".to_owned(),
            ));
        }
        tick.validate()?;
        Ok(animation.advance(tick, notify))
    }

    /// Like [`ClockOverride::advance`], reading the pair from the host
    /// timeline's current state instead of an explicit tick.
    pub fn advance_from(
        animation: &mut Animation,
        timeline: &dyn HostTimeline,
        notify: bool,
    ) -> ChartResult<AdvanceReport> {
        Self::advance(animation, timeline.current_tick(), notify)
    }
}
