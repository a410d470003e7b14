//! Host timeline boundary: the external per-frame clock this crate subscribes to.

mod manual;

pub use manual::ManualTimeline;

use serde::{Deserialize, Serialize};

use crate::core::FrameTick;
use crate::error::ChartResult;

/// Callback invoked once per host frame. Errors propagate to whoever is
/// dispatching the frame.
pub type FrameCallback = Box<dyn FnMut(FrameTick) -> ChartResult<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Per-frame notification source owned by the host application.
pub trait HostTimeline {
    /// Subscribes `callback` to every subsequent frame until the returned
    /// token is cancelled or dropped.
    fn add_frame_callback(&self, callback: FrameCallback) -> Subscription;

    /// Time and delta of the most recently dispatched frame.
    fn current_tick(&self) -> FrameTick;
}

/// Cancellable registration token returned by [`HostTimeline::add_frame_callback`].
///
/// Cancelling is idempotent and also happens on drop.
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    #[must_use]
    pub fn new(id: SubscriptionId, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
