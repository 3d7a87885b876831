use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Identifiers that are legitimately unreachable by sequential focus
/// (system navigation controls and the like).
pub const DEFAULT_WHITELIST: &[&str] = &[
    "id/back",
    "id/g_icon",
    "id/home",
    "id/now_header_doodle_view",
    "id/recent_apps",
];

/// Element identifiers exempt from the unreachable-element category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Whitelist {
    ids: HashSet<String>,
}

impl Whitelist {
    pub fn empty() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        DEFAULT_WHITELIST.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
