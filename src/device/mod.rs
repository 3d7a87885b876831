//! Collaborators the audit engine talks to.
//!
//! The explorer and auditor only see these traits; `bridge` implements them
//! over a helper process and `scripted` implements them in memory.

use std::time::Duration;

use crate::frame::frame_model::FrameCapture;
use crate::node::node_model::{NodeFilter, NodeSnapshot, Target};

pub mod bridge;
pub mod error;
pub mod scripted;

use error::DeviceError;

/// Queries the UI hierarchy / accessibility tree.
pub trait HierarchyService {
    fn query_nodes(&mut self, filter: &NodeFilter) -> Result<Vec<NodeSnapshot>, DeviceError>;
}

/// Injects discrete input events.
pub trait InputInjector {
    /// One focus-advance event. Returns once the injector's settle delay has
    /// elapsed and the hierarchy is safe to query.
    fn advance_focus(&mut self) -> Result<(), DeviceError>;

    /// Block until the UI has been idle for `timeout` after the last
    /// interaction.
    fn wait_for_idle(&mut self, timeout: Duration) -> Result<(), DeviceError>;
}

/// Captures the screen.
pub trait ScreenCapture {
    fn capture_frame(&mut self) -> Result<FrameCapture, DeviceError>;
}

/// Starts and dismisses the application under test.
pub trait LifecycleController {
    fn launch_target(&mut self, target: &Target) -> Result<(), DeviceError>;
    fn return_home(&mut self) -> Result<(), DeviceError>;
}

/// Everything a full check suite needs from one device.
pub trait Device: HierarchyService + InputInjector + ScreenCapture + LifecycleController {}

impl<T> Device for T where T: HierarchyService + InputInjector + ScreenCapture + LifecycleController {}

/// The unique focused node, or `None` when zero or several nodes report
/// focus.
pub fn focused_node<D>(device: &mut D) -> Result<Option<NodeSnapshot>, DeviceError>
where
    D: HierarchyService + ?Sized,
{
    let mut focused = device.query_nodes(&NodeFilter::focused())?;
    if focused.len() != 1 {
        return Ok(None);
    }
    Ok(focused.pop())
}
