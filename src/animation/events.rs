use serde::{Deserialize, Serialize};

/// Event stream emitted by an animation driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimationEvent {
    /// One frame was advanced; `delta` is the elapsed host time in ms.
    Frame { delta: f64 },
    Paused,
    Resumed,
}

/// Observer hook for animation events.
///
/// Listeners see events in emission order and cannot reach back into the
/// clip sequence.
pub trait AnimationListener {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: AnimationEvent);
}
