use std::collections::HashSet;

use tracing::{info, warn};

use crate::audit::whitelist::Whitelist;
use crate::node::identity::fingerprint;
use crate::node::node_model::NodeSnapshot;

/// Outcome of one reachability audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResult {
    /// Reachable by focus-advance but not clickable
    pub focusable_traps: Vec<NodeSnapshot>,

    /// Clickable but never reached, whitelist excluded
    pub unreachable: Vec<NodeSnapshot>,
}

impl AuditResult {
    pub fn passed(&self) -> bool {
        self.focusable_traps.is_empty() && self.unreachable.is_empty()
    }

    /// One operator-facing entry per violating element.
    pub fn diagnostics(&self) -> Vec<String> {
        let traps = self.focusable_traps.iter().map(|n| {
            format!(
                "Element can be focused with the keyboard but isn't clickable:\n{}",
                n.describe()
            )
        });
        let unreachable = self.unreachable.iter().map(|n| {
            format!(
                "Element is clickable but not accessible via keyboard:\n{}",
                n.describe()
            )
        });
        traps.chain(unreachable).collect()
    }

    /// Aggregate message for a failed audit, `None` when it passed.
    pub fn failure_message(&self) -> Option<String> {
        if self.passed() {
            return None;
        }
        Some(format!(
            "Some issues were found: {} focusable element(s) not clickable, \
             {} clickable element(s) not reachable via keyboard",
            self.focusable_traps.len(),
            self.unreachable.len()
        ))
    }
}

/// Cross-references the focus-reachable set with every clickable element.
#[derive(Debug, Clone)]
pub struct Auditor {
    whitelist: Whitelist,
}

impl Auditor {
    pub fn new(whitelist: Whitelist) -> Self {
        Self { whitelist }
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Compare `visited` (from a completed exploration) with `clickable`
    /// (every clickable node in scope).
    pub fn audit(&self, visited: &[NodeSnapshot], clickable: &[NodeSnapshot]) -> AuditResult {
        let visited_ids: HashSet<String> = visited.iter().map(|n| fingerprint(Some(n))).collect();

        let focusable_traps: Vec<NodeSnapshot> = visited
            .iter()
            .filter(|n| !n.is_clickable())
            .cloned()
            .collect();

        let unreachable: Vec<NodeSnapshot> = clickable
            .iter()
            .filter(|n| !visited_ids.contains(&fingerprint(Some(n))))
            .filter(|n| !self.whitelist.contains(&n.id))
            .cloned()
            .collect();

        let result = AuditResult {
            focusable_traps,
            unreachable,
        };

        info!(
            "audited {} visited against {} clickable elements",
            visited.len(),
            clickable.len()
        );
        for entry in result.diagnostics() {
            warn!("{}", entry);
        }

        result
    }
}
