use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::error::DeviceError;
use crate::device::{HierarchyService, InputInjector, LifecycleController, ScreenCapture};
use crate::frame::frame_model::{FrameCapture, PixelFormat};
use crate::node::node_model::{NodeFilter, NodeSnapshot, Target};

/// Request sent to the bridge over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BridgeRequest<'a> {
    QueryNodes { filter: &'a NodeFilter },
    AdvanceFocus,
    WaitIdle { timeout_ms: u64 },
    CaptureFrame,
    Launch { package: &'a str, activity: &'a str },
    Home,
    Quit,
}

impl BridgeRequest<'_> {
    fn name(&self) -> &'static str {
        match self {
            BridgeRequest::QueryNodes { .. } => "query_nodes",
            BridgeRequest::AdvanceFocus => "advance_focus",
            BridgeRequest::WaitIdle { .. } => "wait_idle",
            BridgeRequest::CaptureFrame => "capture_frame",
            BridgeRequest::Launch { .. } => "launch",
            BridgeRequest::Home => "home",
            BridgeRequest::Quit => "quit",
        }
    }
}

/// Raw frame as shipped by the bridge; `data` is base64.
#[derive(Debug, Deserialize)]
pub struct FramePayload {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: String,
}

/// Response read from the bridge's stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub nodes: Option<Vec<NodeSnapshot>>,
    #[serde(default)]
    pub frame: Option<FramePayload>,
}

/// A live connection to a device bridge helper.
///
/// The helper is a long-lived process that owns the device connection
/// (view server, input injection, framebuffer). Commands are NDJSON over
/// stdin, responses NDJSON over stdout. The helper announces itself with
/// `{"ok":true,"ready":true}` before accepting commands.
pub struct BridgeSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    closed: bool,
}

impl BridgeSession {
    /// Spawn `command args...` and wait for its ready signal.
    pub fn launch(command: &str, args: &[String]) -> Result<Self, DeviceError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DeviceError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DeviceError::Protocol("bridge stdin was not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DeviceError::Protocol("bridge stdout was not captured".into()))?;

        let mut session = BridgeSession {
            child,
            stdin,
            reader: BufReader::new(stdout),
            closed: false,
        };

        let ready = session.read_response("ready signal")?;
        if !ready.ok || ready.ready != Some(true) {
            return Err(DeviceError::Protocol(
                "bridge did not send a ready signal".into(),
            ));
        }

        debug!(command, "device bridge ready");
        Ok(session)
    }

    fn read_response(&mut self, context: &str) -> Result<BridgeResponse, DeviceError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 || line.trim().is_empty() {
            return Err(DeviceError::Disconnected);
        }

        serde_json::from_str(line.trim()).map_err(|source| DeviceError::Json {
            context: context.to_string(),
            source,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BridgeRequest<'_>) -> Result<BridgeResponse, DeviceError> {
        let json = serde_json::to_string(request).map_err(|source| DeviceError::Json {
            context: format!("{} request", request.name()),
            source,
        })?;

        writeln!(self.stdin, "{}", json)?;
        self.stdin.flush()?;

        self.read_response(request.name())
    }

    /// Send a request and verify the bridge reported success.
    fn send_ok(&mut self, request: &BridgeRequest<'_>) -> Result<BridgeResponse, DeviceError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(DeviceError::Command {
                command: request.name().to_string(),
                message: response.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Ask the bridge to exit and reap it. Safe to call more than once.
    pub fn quit(&mut self) -> Result<(), DeviceError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Best-effort: the process may already be gone.
        if let Err(e) = self.send(&BridgeRequest::Quit) {
            debug!("bridge quit request failed: {}", e);
        }
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for BridgeSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("failed to shut down device bridge: {}", e);
        }
    }
}

impl HierarchyService for BridgeSession {
    fn query_nodes(&mut self, filter: &NodeFilter) -> Result<Vec<NodeSnapshot>, DeviceError> {
        let response = self.send_ok(&BridgeRequest::QueryNodes { filter })?;
        response
            .nodes
            .ok_or_else(|| DeviceError::Protocol("no nodes in query_nodes response".into()))
    }
}

impl InputInjector for BridgeSession {
    fn advance_focus(&mut self) -> Result<(), DeviceError> {
        self.send_ok(&BridgeRequest::AdvanceFocus)?;
        Ok(())
    }

    fn wait_for_idle(&mut self, timeout: Duration) -> Result<(), DeviceError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.send_ok(&BridgeRequest::WaitIdle { timeout_ms })?;
        Ok(())
    }
}

impl ScreenCapture for BridgeSession {
    fn capture_frame(&mut self) -> Result<FrameCapture, DeviceError> {
        let response = self.send_ok(&BridgeRequest::CaptureFrame)?;
        let payload = response
            .frame
            .ok_or_else(|| DeviceError::Protocol("no frame in capture_frame response".into()))?;
        decode_frame(payload)
    }
}

impl LifecycleController for BridgeSession {
    fn launch_target(&mut self, target: &Target) -> Result<(), DeviceError> {
        self.send_ok(&BridgeRequest::Launch {
            package: &target.package,
            activity: &target.activity,
        })?;
        Ok(())
    }

    fn return_home(&mut self) -> Result<(), DeviceError> {
        self.send_ok(&BridgeRequest::Home)?;
        Ok(())
    }
}

/// Validate and decode a frame payload received from the bridge.
pub fn decode_frame(payload: FramePayload) -> Result<FrameCapture, DeviceError> {
    let f = payload.format;
    let format = PixelFormat::new(f.bpp, f.red, f.green, f.blue, f.alpha).ok_or_else(|| {
        DeviceError::Protocol(format!("unsupported frame format: {:?}", f))
    })?;
    let data = BASE64.decode(payload.data.as_bytes())?;
    Ok(FrameCapture::new(payload.width, payload.height, format, data))
}
