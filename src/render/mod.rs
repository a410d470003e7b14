mod canvas;
mod null_sink;
mod primitives;

pub use canvas::Canvas;
pub use null_sink::NullTextureSink;
pub use primitives::{Color, RectPrimitive};

use crate::error::ChartResult;

/// Contract implemented by anything that turns a painted chart canvas into a
/// displayable texture.
///
/// Sinks receive the canvas exactly as the chart engine painted it, so pixel
/// upload stays isolated from chart and timing logic.
pub trait TextureSink {
    fn upload(&mut self, canvas: &Canvas) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_sink;
#[cfg(feature = "cairo-backend")]
pub use cairo_sink::CairoTextureSink;
