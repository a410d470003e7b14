use crate::error::ChartResult;

use super::UpdateInterval;

/// Periodic callback receiving the live chart handle.
pub type UpdateCallback<H> = Box<dyn FnMut(&mut H) -> ChartResult<()>>;

/// Host-time accumulator deciding when the update callback is due.
///
/// The accumulator only grows between fires and drops to exactly zero after
/// each fire; overshoot is not carried over.
pub struct CallbackSchedule<H> {
    callback: UpdateCallback<H>,
    interval_millis: f64,
    accumulated_millis: f64,
}

impl<H> CallbackSchedule<H> {
    pub fn new(callback: UpdateCallback<H>, interval: UpdateInterval) -> ChartResult<Self> {
        interval.validate()?;
        Ok(Self {
            callback,
            interval_millis: interval.as_millis(),
            accumulated_millis: 0.0,
        })
    }

    #[must_use]
    pub fn interval_millis(&self) -> f64 {
        self.interval_millis
    }

    #[must_use]
    pub fn accumulated_millis(&self) -> f64 {
        self.accumulated_millis
    }

    /// Adds `delta` ms and reports whether the callback is now due.
    pub fn accumulate(&mut self, delta: f64) -> bool {
        self.accumulated_millis += delta;
        self.accumulated_millis >= self.interval_millis
    }

    /// Runs the callback and resets the accumulator. A failing callback
    /// leaves the accumulator untouched.
    pub fn fire(&mut self, chart: &mut H) -> ChartResult<()> {
        (self.callback)(chart)?;
        self.accumulated_millis = 0.0;
        Ok(())
    }

    /// Runs the callback outside the interval cadence.
    pub fn invoke(&mut self, chart: &mut H) -> ChartResult<()> {
        (self.callback)(chart)
    }
}

impl<H> std::fmt::Debug for CallbackSchedule<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSchedule")
            .field("interval_millis", &self.interval_millis)
            .field("accumulated_millis", &self.accumulated_millis)
            .finish_non_exhaustive()
    }
}
