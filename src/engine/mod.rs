//! Chart-engine boundary.
//!
//! Option semantics, layout and painting belong to the engine; this crate only
//! needs to create a handle on a surface, forward options, reach the handle's
//! animation driver, and read back the painted canvas.

mod headless;
mod options;

pub use headless::{HeadlessChart, HeadlessEngine};
pub use options::{SetOptionOpts, merge_option};

use serde_json::Value;

use crate::animation::Animation;
use crate::core::Theme;
use crate::error::ChartResult;
use crate::render::Canvas;

/// Factory for chart handles bound to a surface and a theme.
pub trait ChartEngine {
    type Handle: ChartHandle;

    fn init(&mut self, surface: Canvas, theme: &Theme) -> ChartResult<Self::Handle>;
}

/// One live chart instance.
pub trait ChartHandle {
    fn set_option(&mut self, option: &Value, opts: &SetOptionOpts) -> ChartResult<()>;

    /// The effective option after all merges.
    fn option(&self) -> &Value;

    /// The internal animation driver, if the engine exposes one.
    fn animation(&self) -> Option<&Animation>;

    fn animation_mut(&mut self) -> Option<&mut Animation>;

    /// The painted canvas, repainted first if anything changed.
    fn surface(&mut self) -> ChartResult<&Canvas>;

    /// Releases the chart. Idempotent.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}
