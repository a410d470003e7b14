use thiserror::Error;

use crate::bridge::BridgeState;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("chart handle exposes no animation driver")]
    MissingAnimationDriver,

    #[error("animation driver is unusable: {0}")]
    MalformedAnimationDriver(String),

    #[error("theme name must not be empty")]
    MissingTheme,

    #[error("`{operation}` is not allowed while the bridge is {state:?}")]
    InvalidLifecycle {
        operation: &'static str,
        state: BridgeState,
    },

    #[error("update callback failed: {0}")]
    Callback(String),
}
