use std::time::Duration;

use crate::device::error::DeviceError;
use crate::device::{HierarchyService, InputInjector, LifecycleController, ScreenCapture};
use crate::frame::frame_model::FrameCapture;
use crate::node::node_model::{NodeFilter, NodePredicate, NodeSnapshot, Target};

/// Interaction recorded by [`ScriptedDevice`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Query(NodePredicate),
    AdvanceFocus,
    WaitIdle(Duration),
    Capture,
    Launch(String),
    Home,
}

/// In-memory device driven by a script (no hardware needed).
///
/// `focus_script[i]` is what the focused-node query reports after `i`
/// focus-advance events; `None` models zero or ambiguous focus, as does
/// running off the end of the script. Frames are handed out in order and
/// the last one repeats once the list is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDevice {
    pub focus_script: Vec<Option<NodeSnapshot>>,
    pub clickable: Vec<NodeSnapshot>,
    pub frames: Vec<FrameCapture>,
    pub events: Vec<DeviceEvent>,
    pub fail_lifecycle: bool,
    advances: usize,
    captures: usize,
}

impl ScriptedDevice {
    pub fn new(focus_script: Vec<Option<NodeSnapshot>>) -> Self {
        Self {
            focus_script,
            ..Self::default()
        }
    }

    /// Script where every entry has unique focus.
    pub fn with_focus_sequence(nodes: Vec<NodeSnapshot>) -> Self {
        Self::new(nodes.into_iter().map(Some).collect())
    }

    pub fn with_clickable(mut self, clickable: Vec<NodeSnapshot>) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn with_frames(mut self, frames: Vec<FrameCapture>) -> Self {
        self.frames = frames;
        self
    }

    /// Number of focus-advance events injected so far.
    pub fn advance_count(&self) -> usize {
        self.advances
    }

    fn lifecycle_result(&self, command: &str) -> Result<(), DeviceError> {
        if self.fail_lifecycle {
            return Err(DeviceError::Command {
                command: command.to_string(),
                message: "scripted lifecycle failure".into(),
            });
        }
        Ok(())
    }
}

impl HierarchyService for ScriptedDevice {
    fn query_nodes(&mut self, filter: &NodeFilter) -> Result<Vec<NodeSnapshot>, DeviceError> {
        self.events.push(DeviceEvent::Query(filter.predicate));
        match filter.predicate {
            NodePredicate::Focused => Ok(self
                .focus_script
                .get(self.advances)
                .cloned()
                .flatten()
                .into_iter()
                .collect()),
            NodePredicate::Clickable => Ok(self.clickable.clone()),
        }
    }
}

impl InputInjector for ScriptedDevice {
    fn advance_focus(&mut self) -> Result<(), DeviceError> {
        self.events.push(DeviceEvent::AdvanceFocus);
        self.advances += 1;
        Ok(())
    }

    fn wait_for_idle(&mut self, timeout: Duration) -> Result<(), DeviceError> {
        self.events.push(DeviceEvent::WaitIdle(timeout));
        Ok(())
    }
}

impl ScreenCapture for ScriptedDevice {
    fn capture_frame(&mut self) -> Result<FrameCapture, DeviceError> {
        self.events.push(DeviceEvent::Capture);
        let index = self.captures.min(self.frames.len().saturating_sub(1));
        self.captures += 1;
        self.frames
            .get(index)
            .cloned()
            .ok_or_else(|| DeviceError::Protocol("no scripted frames".into()))
    }
}

impl LifecycleController for ScriptedDevice {
    fn launch_target(&mut self, target: &Target) -> Result<(), DeviceError> {
        self.events.push(DeviceEvent::Launch(target.to_string()));
        self.lifecycle_result("launch")
    }

    fn return_home(&mut self) -> Result<(), DeviceError> {
        self.events.push(DeviceEvent::Home);
        self.lifecycle_result("home")
    }
}
