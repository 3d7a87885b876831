use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::node::identity::fingerprint;
use crate::node::node_model::NodeSnapshot;

// ============================================================================
// Explorer configuration
// ============================================================================

/// Limits for one focus exploration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Observations (initial node included) allowed before giving up on
    /// cycle closure (default 40)
    #[serde(default = "default_max_cycle_length")]
    pub max_cycle_length: usize,

    /// Largest acceptable top-level tab order (default 15)
    #[serde(default = "default_max_top_level_elements")]
    pub max_top_level_elements: usize,

    /// Consecutive focus-advance events without a uniquely focused node
    /// before seeking or exploring fails (default 100)
    #[serde(default = "default_max_focus_retries")]
    pub max_focus_retries: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_cycle_length: default_max_cycle_length(),
            max_top_level_elements: default_max_top_level_elements(),
            max_focus_retries: default_max_focus_retries(),
        }
    }
}

fn default_max_cycle_length() -> usize { 40 }
fn default_max_top_level_elements() -> usize { 15 }
fn default_max_focus_retries() -> usize { 100 }

// ============================================================================
// State machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExplorerState {
    SeekingInitialFocus,
    Exploring,
    CycleClosed,
    BoundExceeded,
}

impl ExplorerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExplorerState::CycleClosed | ExplorerState::BoundExceeded)
    }
}

/// What a single call to `FocusExplorer::step` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No unique focus yet; one focus-advance event was injected
    StillSeeking,

    /// Initial focus found; exploration starts here
    FocusAcquired { fingerprint: String },

    /// Advance produced no unique focus; not counted as a step
    FocusAmbiguous,

    /// Advance reached a node not seen before
    Visited { fingerprint: String },

    /// Advance returned to a visited node
    CycleClosed { fingerprint: String, short_cycle: bool },

    /// Advance reached a new node and used up the step budget before the
    /// cycle closed
    BoundExceeded { fingerprint: String, steps: usize },

    /// The explorer is already in a terminal state
    Halted,
}

// ============================================================================
// Visited set
// ============================================================================

/// Nodes reached by focus-advance during one run, in visit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedSet {
    initial: String,
    fingerprints: HashSet<String>,
    nodes: Vec<NodeSnapshot>,
}

impl VisitedSet {
    /// Start a set containing only the initially focused node.
    pub fn seeded(initial: NodeSnapshot) -> Self {
        let id = fingerprint(Some(&initial));
        let mut fingerprints = HashSet::new();
        fingerprints.insert(id.clone());
        Self {
            initial: id,
            fingerprints,
            nodes: vec![initial],
        }
    }

    /// Record a node. Returns `false` (and records nothing) if its
    /// fingerprint was already present.
    pub fn insert(&mut self, node: NodeSnapshot) -> bool {
        if !self.fingerprints.insert(fingerprint(Some(&node))) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    pub fn initial_fingerprint(&self) -> &str {
        &self.initial
    }

    pub fn fingerprints(&self) -> &HashSet<String> {
        &self.fingerprints
    }

    pub fn nodes(&self) -> &[NodeSnapshot] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

// ============================================================================
// Exploration report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExplorationOutcome {
    CycleClosed,
    BoundExceeded,
}

/// Result of a run that reached a terminal state.
#[derive(Debug, Clone)]
pub struct ExplorationReport {
    pub outcome: ExplorationOutcome,
    pub visited: VisitedSet,

    /// Observations made, counting the initial node and the closing one
    pub steps: usize,

    /// Fingerprint that closed the cycle, if it closed
    pub closing_fingerprint: Option<String>,

    /// The cycle closed on a visited node other than the initial one
    pub short_cycle: bool,
}

impl ExplorationReport {
    pub fn cycle_closed(&self) -> bool {
        self.outcome == ExplorationOutcome::CycleClosed
    }

    /// Number of distinct elements in the cycle.
    pub fn cycle_length(&self) -> usize {
        self.visited.len()
    }
}
