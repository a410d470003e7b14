use crate::animation::{AdvanceReport, DriverAdvance, DriverCore, DriverKind};
use crate::core::FrameTick;

/// Timing strategy that never schedules a timer of its own.
///
/// Starting it only marks the driver as running; clips move exclusively when
/// a host calls `advance` with its own `(time, delta)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalClock;

impl DriverAdvance for ExternalClock {
    fn kind(&self) -> DriverKind {
        DriverKind::External
    }

    fn start_loop(&mut self, core: &mut DriverCore) {
        core.mark_running();
    }

    fn advance(&mut self, core: &mut DriverCore, tick: FrameTick, notify: bool) -> AdvanceReport {
        let mut report = core.step_clips(tick);
        if notify {
            core.notify_frame(tick.delta);
            report.notified = true;
        }
        report
    }
}
