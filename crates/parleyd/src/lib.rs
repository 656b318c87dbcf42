//! Runtime for the Parley chat-bot daemon.
//!
//! The daemon loads configuration through [`parley_config`], installs
//! structured telemetry, and prepares the credential directory, restoring a
//! portable session blob when no usable local session exists. It then hands
//! control to the connection [`supervisor`], which keeps a single protocol
//! connection alive: it reconnects with capped linear backoff after
//! recoverable closes, stops for good on a logout, sends periodic presence
//! heartbeats while open, and exports a freshly paired session once so it
//! can seed other deployments.
//!
//! Inbound messages are routed to commands from [`parley_commands`]. The
//! protocol itself sits behind the [`protocol::Connector`] and
//! [`protocol::Link`] traits; the bundled [`console`] connector drives the
//! daemon from standard input and is what the `parleyd` binary runs.
//!
//! Health reporting hooks emit structured events at each lifecycle stage so
//! operators can follow pairing, reconnects and exports from the logs alone.

mod bootstrap;
pub mod console;
mod health;
mod process;
pub mod protocol;
pub mod supervisor;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownToken, SignalListener, run_daemon};
pub use supervisor::{Supervisor, SupervisorExit, SupervisorSettings};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
