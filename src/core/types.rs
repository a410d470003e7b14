use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

pub const DEFAULT_CANVAS_WIDTH: u32 = 300;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

/// One host-timeline notification. Both fields are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTick {
    pub time: f64,
    pub delta: f64,
}

impl FrameTick {
    #[must_use]
    pub const fn new(time: f64, delta: f64) -> Self {
        Self { time, delta }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.time.is_finite() || !self.delta.is_finite() {
            return Err(ChartError::InvalidData(
                "frame tick time and delta must be finite".to_owned(),
            ));
        }
        if self.delta < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "frame tick delta must be >= 0, got {}",
                self.delta
            )));
        }
        Ok(())
    }
}

/// Visual theme name handed to the chart engine on init.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(String);

impl Theme {
    pub const LIGHT: &'static str = "light";
    pub const DARK: &'static str = "dark";

    #[must_use]
    pub fn light() -> Self {
        Self(Self::LIGHT.to_owned())
    }

    #[must_use]
    pub fn dark() -> Self {
        Self(Self::DARK.to_owned())
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.0.trim().is_empty() {
            return Err(ChartError::MissingTheme);
        }
        Ok(())
    }

    /// Canvas clear color. Unknown theme names fall back to a neutral grey.
    #[must_use]
    pub fn background(&self) -> Color {
        match self.0.as_str() {
            Self::LIGHT => Color::rgb(1.0, 1.0, 1.0),
            Self::DARK => Color::rgb(0.063, 0.047, 0.165),
            _ => Color::rgb(0.94, 0.94, 0.94),
        }
    }

    /// Fill color for the `index`-th series.
    #[must_use]
    pub fn series_color(&self, index: usize) -> Color {
        const LIGHT_PALETTE: [Color; 4] = [
            Color::rgb(0.329, 0.439, 0.776),
            Color::rgb(0.569, 0.800, 0.459),
            Color::rgb(0.980, 0.784, 0.345),
            Color::rgb(0.933, 0.400, 0.400),
        ];
        const DARK_PALETTE: [Color; 4] = [
            Color::rgb(0.867, 0.420, 0.400),
            Color::rgb(0.459, 0.604, 0.627),
            Color::rgb(0.902, 0.616, 0.529),
            Color::rgb(0.553, 0.757, 0.663),
        ];
        let palette = if self.0 == Self::DARK {
            &DARK_PALETTE
        } else {
            &LIGHT_PALETTE
        };
        palette[index % palette.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
