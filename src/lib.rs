//! chart-clock: drive a chart engine's animation from an external timeline.
//!
//! A chart engine normally animates on its own free-running timer. This crate
//! swaps that timer for a host-driven clock, so every chart frame corresponds
//! to exactly one frame of the host's timeline, and exposes the painted chart
//! to the host as a texture.

pub mod animation;
pub mod api;
pub mod bridge;
pub mod clock;
pub mod core;
pub mod engine;
pub mod error;
pub mod host;
pub mod render;
pub mod telemetry;

pub use api::{ChartComponent, ChartComponentConfig};
pub use bridge::{BridgeState, FrameBridge, UpdateInterval};
pub use clock::ClockOverride;
pub use error::{ChartError, ChartResult};
