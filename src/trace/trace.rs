use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::explorer::explorer_model::{ExplorerState, Transition};

/// One line of the exploration trace file.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub check: String,
    pub step: usize,

    pub state: String,
    pub transition: String,

    pub fingerprint: Option<String>,
    pub frame_digest: Option<String>,
    pub note: Option<String>,
}

impl TraceEvent {
    pub fn now(check: &str, step: usize, state: ExplorerState) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            check: check.to_string(),
            step,
            state: format!("{:?}", state),
            transition: String::new(),
            fingerprint: None,
            frame_digest: None,
            note: None,
        }
    }

    pub fn with_transition(mut self, transition: &Transition) -> Self {
        let (name, fingerprint) = match transition {
            Transition::StillSeeking => ("still_seeking", None),
            Transition::FocusAcquired { fingerprint } => ("focus_acquired", Some(fingerprint)),
            Transition::FocusAmbiguous => ("focus_ambiguous", None),
            Transition::Visited { fingerprint } => ("visited", Some(fingerprint)),
            Transition::CycleClosed { fingerprint, .. } => ("cycle_closed", Some(fingerprint)),
            Transition::BoundExceeded { fingerprint, .. } => ("bound_exceeded", Some(fingerprint)),
            Transition::Halted => ("halted", None),
        };
        self.transition = name.to_string();
        self.fingerprint = fingerprint.cloned();
        if let Transition::CycleClosed { short_cycle: true, .. } = transition {
            self.note = Some("short_cycle".into());
        }
        self
    }

    pub fn with_frame_digest(mut self, digest: impl ToString) -> Self {
        self.frame_digest = Some(digest.to_string());
        self
    }

    pub fn with_note(mut self, note: impl ToString) -> Self {
        self.note = Some(note.to_string());
        self
    }
}
