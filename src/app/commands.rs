//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial console,
//! a future provisioning channel) that the
//! [`ControlService`](super::service::ControlService) interprets and acts
//! upon.

use crate::config::FanConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Hot-reload configuration. Rejected (and logged) if it fails the
    /// construction-time invariant checks.
    UpdateConfig(FanConfig),

    /// Pin the fan at maximum duty immediately (debug / bench testing).
    /// Normal mapping resumes on the next evaluated sample.
    ForceMaximum,
}
