use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Property keys emitted by the view hierarchy dump
// ============================================================================

pub const PROP_CLICKABLE: &str = "misc:clickable";
pub const PROP_FOCUSED: &str = "focus:isFocused";
pub const PROP_TEXT: &str = "text:text";
pub const PROP_CONTENT_DESC: &str = "accessibility:contentDescription";

// ============================================================================
// Geometry
// ============================================================================

/// Bounding rectangle in screen coordinates. `right`/`bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Widened to `i64`: bounds reported by a device can span more than
    /// `i32::MAX`.
    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {} - {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

// ============================================================================
// Node snapshot
// ============================================================================

/// Point-in-time description of one element in the UI hierarchy.
///
/// Produced by a `HierarchyService` on demand and never mutated afterwards.
/// `id` is the application-assigned identifier and may repeat across
/// elements; identity for set membership comes from
/// [`fingerprint`](crate::node::identity::fingerprint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub bounds: Rect,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl NodeSnapshot {
    pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            properties: HashMap::new(),
        }
    }

    /// Builder-style property setter, mostly for fixtures.
    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Text content, empty when the property is missing.
    pub fn text(&self) -> &str {
        self.property(PROP_TEXT).unwrap_or("")
    }

    /// Accessibility content description, empty when missing.
    pub fn content_description(&self) -> &str {
        self.property(PROP_CONTENT_DESC).unwrap_or("")
    }

    /// True iff the clickable property is present and equals `"true"`.
    pub fn is_clickable(&self) -> bool {
        self.property(PROP_CLICKABLE) == Some("true")
    }

    pub fn is_focused(&self) -> bool {
        self.property(PROP_FOCUSED) == Some("true")
    }

    /// Multi-line operator-facing description used in violation reports.
    pub fn describe(&self) -> String {
        format!(
            "  id: {}\n  rect: {}\n  text: {}\n  content description: {}",
            self.id,
            self.bounds,
            self.text(),
            self.content_description()
        )
    }
}

// ============================================================================
// Hierarchy query filter
// ============================================================================

/// Which nodes a hierarchy query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodePredicate {
    Focused,
    Clickable,
}

/// Predicate plus optional application/screen scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFilter {
    pub predicate: NodePredicate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl NodeFilter {
    pub fn focused() -> Self {
        Self {
            predicate: NodePredicate::Focused,
            package: None,
            activity: None,
        }
    }

    pub fn clickable() -> Self {
        Self {
            predicate: NodePredicate::Clickable,
            package: None,
            activity: None,
        }
    }

    /// Restrict the filter to a target's package and activity.
    pub fn scoped_to(mut self, target: Option<&Target>) -> Self {
        if let Some(t) = target {
            self.package = Some(t.package.clone());
            self.activity = Some(t.activity.clone());
        }
        self
    }

    /// Evaluate the filter against a snapshot. Scope is ignored here: a
    /// snapshot carries no package information, so scoping is the
    /// responsibility of the hierarchy service.
    pub fn matches(&self, node: &NodeSnapshot) -> bool {
        match self.predicate {
            NodePredicate::Focused => node.is_focused(),
            NodePredicate::Clickable => node.is_clickable(),
        }
    }
}

// ============================================================================
// Target application
// ============================================================================

/// Application screen under test, parsed from a `package/activity` token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub package: String,
    pub activity: String,
}

impl Target {
    /// Parse `package/activity`. Returns `None` when the token has no `/`
    /// or either half is empty.
    pub fn parse(token: &str) -> Option<Self> {
        let (package, activity) = token.split_once('/')?;
        if package.is_empty() || activity.is_empty() {
            return None;
        }
        Some(Self {
            package: package.to_string(),
            activity: activity.to_string(),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.activity)
    }
}
