pub mod types;

pub use types::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, FrameTick, Theme, Viewport};
