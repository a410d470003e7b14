mod component;
mod config;

pub use component::ChartComponent;
pub use config::ChartComponentConfig;
