use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::device::{HierarchyService, InputInjector, focused_node};
use crate::explorer::error::ExploreError;
use crate::explorer::explorer_model::{
    ExplorationOutcome, ExplorationReport, ExplorerConfig, ExplorerState, Transition, VisitedSet,
};
use crate::node::identity::fingerprint;
use crate::node::node_model::NodeSnapshot;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Where a [`FocusExplorer`] is in its run. The visited set only exists
/// once initial focus has been found.
enum Phase {
    Seeking,
    Exploring(VisitedSet),
    Finished {
        outcome: ExplorationOutcome,
        visited: VisitedSet,
    },
}

/// Walks the focus order of the current screen with focus-advance events
/// until it comes back to an element it has already seen.
///
/// Every call to [`step`](FocusExplorer::step) performs at most one
/// inject/observe pair, so callers can interleave their own work (frame
/// captures) between steps. [`run`](FocusExplorer::run) drives it to a
/// terminal state.
pub struct FocusExplorer {
    config: ExplorerConfig,
    phase: Phase,

    /// Distinct nodes observed so far
    observed: usize,

    /// Consecutive observations without a uniquely focused node
    retries: usize,

    closing: Option<String>,
    short_cycle: bool,

    label: String,
    tracer: Option<Arc<TraceLogger>>,
}

impl FocusExplorer {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            phase: Phase::Seeking,
            observed: 0,
            retries: 0,
            closing: None,
            short_cycle: false,
            label: "explore".into(),
            tracer: None,
        }
    }

    /// Record every transition to `tracer`, tagged with `label`.
    pub fn with_tracer(mut self, label: &str, tracer: Arc<TraceLogger>) -> Self {
        self.label = label.to_string();
        self.tracer = Some(tracer);
        self
    }

    pub fn state(&self) -> ExplorerState {
        match &self.phase {
            Phase::Seeking => ExplorerState::SeekingInitialFocus,
            Phase::Exploring(_) => ExplorerState::Exploring,
            Phase::Finished {
                outcome: ExplorationOutcome::CycleClosed,
                ..
            } => ExplorerState::CycleClosed,
            Phase::Finished {
                outcome: ExplorationOutcome::BoundExceeded,
                ..
            } => ExplorerState::BoundExceeded,
        }
    }

    pub fn visited(&self) -> Option<&VisitedSet> {
        match &self.phase {
            Phase::Seeking => None,
            Phase::Exploring(visited) | Phase::Finished { visited, .. } => Some(visited),
        }
    }

    /// Observations so far, counting the initial node.
    pub fn steps(&self) -> usize {
        self.observed
    }

    /// Advance the state machine by one transition.
    pub fn step<D>(&mut self, device: &mut D) -> Result<Transition, ExploreError>
    where
        D: HierarchyService + InputInjector + ?Sized,
    {
        let (phase, result) = match std::mem::replace(&mut self.phase, Phase::Seeking) {
            Phase::Seeking => self.seek(device),
            Phase::Exploring(visited) => self.explore(device, visited),
            finished @ Phase::Finished { .. } => (finished, Ok(Transition::Halted)),
        };
        self.phase = phase;
        let transition = result?;

        if let Some(tracer) = &self.tracer {
            tracer.log(
                &TraceEvent::now(&self.label, self.observed, self.state())
                    .with_transition(&transition),
            );
        }

        Ok(transition)
    }

    /// Step until the cycle closes or the bound is exceeded.
    pub fn run<D>(mut self, device: &mut D) -> Result<ExplorationReport, ExploreError>
    where
        D: HierarchyService + InputInjector + ?Sized,
    {
        loop {
            match self.finish() {
                Ok(report) => return Ok(report),
                Err(explorer) => self = explorer,
            }
            self.step(device)?;
        }
    }

    /// Final report, once a terminal state has been reached.
    pub fn into_report(self) -> Option<ExplorationReport> {
        self.finish().ok()
    }

    /// The report if the run is over, otherwise the explorer back.
    fn finish(self) -> Result<ExplorationReport, Self> {
        let (outcome, visited) = match self.phase {
            Phase::Finished { outcome, visited } => (outcome, visited),
            phase => return Err(Self { phase, ..self }),
        };

        let steps = match outcome {
            ExplorationOutcome::CycleClosed => self.observed + 1,
            ExplorationOutcome::BoundExceeded => self.observed,
        };

        Ok(ExplorationReport {
            outcome,
            visited,
            steps,
            closing_fingerprint: self.closing,
            short_cycle: self.short_cycle,
        })
    }

    fn seek<D>(&mut self, device: &mut D) -> (Phase, Result<Transition, ExploreError>)
    where
        D: HierarchyService + InputInjector + ?Sized,
    {
        let node = match self.find_initial(device) {
            Ok(Some(node)) => node,
            Ok(None) => return (Phase::Seeking, Ok(Transition::StillSeeking)),
            Err(e) => return (Phase::Seeking, Err(e)),
        };

        let id = fingerprint(Some(&node));
        debug!("initial focus: {}", id);

        let visited = VisitedSet::seeded(node);
        self.observed = 1;
        self.retries = 0;

        let phase = if self.observed >= self.config.max_cycle_length {
            Phase::Finished {
                outcome: ExplorationOutcome::BoundExceeded,
                visited,
            }
        } else {
            Phase::Exploring(visited)
        };
        (phase, Ok(Transition::FocusAcquired { fingerprint: id }))
    }

    /// Query for a unique focus; inject one advance when there is none.
    fn find_initial<D>(&mut self, device: &mut D) -> Result<Option<NodeSnapshot>, ExploreError>
    where
        D: HierarchyService + InputInjector + ?Sized,
    {
        if let Some(node) = focused_node(device)? {
            return Ok(Some(node));
        }
        if self.retries >= self.config.max_focus_retries {
            return Err(ExploreError::NoFocusableElement {
                attempts: self.retries,
            });
        }
        device.advance_focus()?;
        self.retries += 1;
        Ok(None)
    }

    fn explore<D>(
        &mut self,
        device: &mut D,
        mut visited: VisitedSet,
    ) -> (Phase, Result<Transition, ExploreError>)
    where
        D: HierarchyService + InputInjector + ?Sized,
    {
        let result = self.advance(device, &mut visited);
        let outcome = match &result {
            Ok(Transition::CycleClosed { .. }) => Some(ExplorationOutcome::CycleClosed),
            Ok(Transition::BoundExceeded { .. }) => Some(ExplorationOutcome::BoundExceeded),
            _ => None,
        };
        let phase = match outcome {
            Some(outcome) => Phase::Finished { outcome, visited },
            None => Phase::Exploring(visited),
        };
        (phase, result)
    }

    /// One inject/observe pair against the visited set.
    fn advance<D>(
        &mut self,
        device: &mut D,
        visited: &mut VisitedSet,
    ) -> Result<Transition, ExploreError>
    where
        D: HierarchyService + InputInjector + ?Sized,
    {
        device.advance_focus()?;

        let Some(node) = focused_node(device)? else {
            self.retries += 1;
            if self.retries > self.config.max_focus_retries {
                return Err(ExploreError::FocusLost {
                    retries: self.retries,
                });
            }
            debug!("focus ambiguous after advance, retrying");
            return Ok(Transition::FocusAmbiguous);
        };
        self.retries = 0;

        let id = fingerprint(Some(&node));
        if visited.contains(&id) {
            let short_cycle = id != visited.initial_fingerprint();
            if short_cycle {
                warn!(
                    "back at previously visited node but not at initial state; \
                     is there a short cycle in keyboard-navigable elements? ({})",
                    id
                );
            }
            info!("cycled through {} elements", visited.len());

            self.closing = Some(id.clone());
            self.short_cycle = short_cycle;
            return Ok(Transition::CycleClosed {
                fingerprint: id,
                short_cycle,
            });
        }

        visited.insert(node);
        self.observed += 1;

        if self.observed >= self.config.max_cycle_length {
            warn!(
                "focus did not return to a visited element within {} steps",
                self.observed
            );
            return Ok(Transition::BoundExceeded {
                fingerprint: id,
                steps: self.observed,
            });
        }

        Ok(Transition::Visited { fingerprint: id })
    }
}
