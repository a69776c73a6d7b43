//! Subjects.

use serde::{Deserialize, Serialize};

/// A subject a pupil takes.
///
/// `engage_code` is the upstream natural key; `id` is only set once the
/// subject has been stored locally. Marks parsed from a render only know the
/// subject by `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub engage_code: String,
    #[serde(default)]
    pub name: String,
}

impl Subject {
    /// Subject as reported by the upstream subject list.
    pub fn upstream(engage_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            engage_code: engage_code.into(),
            name: name.into(),
        }
    }

    /// Subject known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
