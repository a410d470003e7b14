use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flags accompanying a `set_option` call.
///
/// Unset fields defer to whatever base options they are merged over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOptionOpts {
    /// Replace the stored option instead of merging into it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_merge: Option<bool>,
    /// Defer repainting until the next animation frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy_update: Option<bool>,
}

impl SetOptionOpts {
    #[must_use]
    pub fn not_merge(mut self, value: bool) -> Self {
        self.not_merge = Some(value);
        self
    }

    #[must_use]
    pub fn lazy_update(mut self, value: bool) -> Self {
        self.lazy_update = Some(value);
        self
    }

    /// Returns `self` with unset fields filled in from `base`.
    #[must_use]
    pub fn merged_over(self, base: Self) -> Self {
        Self {
            not_merge: self.not_merge.or(base.not_merge),
            lazy_update: self.lazy_update.or(base.lazy_update),
        }
    }

    #[must_use]
    pub fn replaces(self) -> bool {
        self.not_merge.unwrap_or(false)
    }

    #[must_use]
    pub fn is_lazy(self) -> bool {
        self.lazy_update.unwrap_or(false)
    }
}

/// Merges `patch` into `target` the way chart options merge: objects merge
/// key by key, arrays of components merge by index, anything else (data
/// arrays included) is replaced.
pub fn merge_option(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_option(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(patch)) if patch.iter().all(Value::is_object) => {
            for (index, value) in patch.iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => merge_option(existing, value),
                    None => target.push(value.clone()),
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}
