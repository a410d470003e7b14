use serde::{Deserialize, Serialize};

/// Arena key of a clip inside one [`super::Animation`].
///
/// Slots are reused once vacated; the generation tells a stale id apart from
/// the clip that took its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId {
    index: u32,
    generation: u32,
}

impl ClipId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// One in-flight animation unit owned by the chart engine.
///
/// Clips are stepped once per driver advance until `step` reports that they
/// finished; finished clips get `on_destroy` exactly once and are never stepped
/// again.
pub trait Clip {
    /// Advances the clip to `time` (ms) after `delta` ms elapsed.
    /// Returns `true` when the clip has finished.
    fn step(&mut self, time: f64, delta: f64) -> bool;

    fn on_destroy(&mut self) {}
}

/// Clip backed by a closure, handy for one-off transitions and tests.
pub struct FnClip<F> {
    step: F,
}

impl<F> FnClip<F>
where
    F: FnMut(f64, f64) -> bool,
{
    #[must_use]
    pub fn new(step: F) -> Self {
        Self { step }
    }
}

impl<F> Clip for FnClip<F>
where
    F: FnMut(f64, f64) -> bool,
{
    fn step(&mut self, time: f64, delta: f64) -> bool {
        (self.step)(time, delta)
    }
}
