use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, Theme, Viewport};
use crate::engine::SetOptionOpts;
use crate::error::{ChartError, ChartResult};

/// Public component configuration.
///
/// This type is serializable so hosts can keep chart components in scene
/// files instead of wiring them up in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartComponentConfig {
    /// Chart option handed to the engine on start.
    #[serde(default)]
    pub option: Value,
    #[serde(default)]
    pub option_opts: SetOptionOpts,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Invoke the update callback once during start.
    #[serde(default)]
    pub update_now: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl ChartComponentConfig {
    /// Creates a 300×300 light-theme config for `option`.
    #[must_use]
    pub fn new(option: Value) -> Self {
        Self {
            option,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ChartError::InvalidData(format!("invalid component config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_option_opts(mut self, opts: SetOptionOpts) -> Self {
        self.option_opts = opts;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_update_now(mut self, update_now: bool) -> Self {
        self.update_now = update_now;
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        Theme::named(self.theme.clone())
    }

    pub fn validate(&self) -> ChartResult<()> {
        let viewport = self.viewport();
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.theme().validate()
    }
}

impl Default for ChartComponentConfig {
    fn default() -> Self {
        Self {
            option: Value::Null,
            option_opts: SetOptionOpts::default(),
            theme: default_theme(),
            update_now: false,
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_theme() -> String {
    Theme::LIGHT.to_owned()
}

fn default_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}
