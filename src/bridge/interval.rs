use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Legacy unit heuristic: plain numbers below this are read as seconds.
pub const LEGACY_SECONDS_THRESHOLD: f64 = 50.0;

/// How often the periodic update callback fires, in host time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum UpdateInterval {
    Seconds(f64),
    Millis(f64),
}

impl UpdateInterval {
    #[must_use]
    pub const fn seconds(value: f64) -> Self {
        Self::Seconds(value)
    }

    #[must_use]
    pub const fn millis(value: f64) -> Self {
        Self::Millis(value)
    }

    /// Interprets a unitless number: values below
    /// [`LEGACY_SECONDS_THRESHOLD`] are seconds, everything else
    /// milliseconds. `1.2` becomes 1200 ms, `1500` stays 1500 ms, and `50`
    /// itself is milliseconds.
    ///
    /// A genuine sub-50 ms interval cannot be expressed this way; use
    /// [`UpdateInterval::millis`] for those.
    #[must_use]
    pub fn from_legacy(value: f64) -> Self {
        if value < LEGACY_SECONDS_THRESHOLD {
            Self::Seconds(value)
        } else {
            Self::Millis(value)
        }
    }

    #[must_use]
    pub fn as_millis(self) -> f64 {
        match self {
            Self::Seconds(seconds) => seconds * 1_000.0,
            Self::Millis(millis) => millis,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        let millis = self.as_millis();
        if !millis.is_finite() || millis < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "update interval must be finite and >= 0, got {self:?}"
            )));
        }
        Ok(())
    }
}
