use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::device::Device;
use crate::suite::checks::{CheckContext, run_check};
use crate::suite::suite_model::{CheckKind, CheckResult, LifecycleConfig};

/// Host-side adapter that runs checks against a device with the usual
/// set-up / tear-down hooks around each one.
///
/// When a target is configured it is dismissed once before the suite,
/// launched in `set_up` and dismissed again in `tear_down`. Lifecycle
/// failures are logged and never turn into check failures.
pub struct SuiteRunner {
    pub context: CheckContext,
    pub lifecycle: LifecycleConfig,
    pub checks: Vec<CheckKind>,
}

impl SuiteRunner {
    pub fn new(context: CheckContext, lifecycle: LifecycleConfig) -> Self {
        Self {
            context,
            lifecycle,
            checks: CheckKind::ALL.to_vec(),
        }
    }

    /// Restrict the run to `checks`, in the given order.
    pub fn with_checks(mut self, checks: Vec<CheckKind>) -> Self {
        self.checks = checks;
        self
    }

    /// Run every selected check and return one result per check.
    pub fn run<D: Device + ?Sized>(&self, device: &mut D) -> Vec<CheckResult> {
        self.dismiss_target(device);

        let mut results = Vec::with_capacity(self.checks.len());
        for &check in &self.checks {
            self.set_up(device, check);

            let start = Instant::now();
            let result = run_check(check, device, &self.context)
                .with_duration(start.elapsed().as_millis());

            if result.passed {
                info!("{}: passed", check);
            } else {
                warn!(
                    "{}: failed: {}",
                    check,
                    result
                        .message
                        .as_deref()
                        .or(result.error.as_deref())
                        .unwrap_or("unknown failure")
                );
            }
            results.push(result);

            self.tear_down(device);
        }
        results
    }

    fn set_up<D: Device + ?Sized>(&self, device: &mut D, check: CheckKind) {
        info!("################################################################");
        info!("running check: {}", check);

        let Some(target) = &self.context.target else {
            return;
        };
        if let Err(e) = device.launch_target(target) {
            warn!("failed to launch {}: {}", target, e);
        }
        self.settle(device, self.lifecycle.launch_settle_ms);
    }

    fn tear_down<D: Device + ?Sized>(&self, device: &mut D) {
        self.dismiss_target(device);
    }

    fn dismiss_target<D: Device + ?Sized>(&self, device: &mut D) {
        if self.context.target.is_none() {
            return;
        }
        if let Err(e) = device.return_home() {
            warn!("failed to dismiss target: {}", e);
        }
        self.settle(device, self.lifecycle.dismiss_settle_ms);
    }

    fn settle<D: Device + ?Sized>(&self, device: &mut D, ms: u64) {
        if let Err(e) = device.wait_for_idle(Duration::from_millis(ms)) {
            warn!("device did not settle: {}", e);
        }
    }
}
