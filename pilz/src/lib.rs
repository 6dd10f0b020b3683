//! Client side of the pilsner controller's UDP command port.
//!
//! The controller listens on UDP port 1234 and acts on single-byte
//! commands. There is no framing and no acknowledgement: reboot commands
//! are fire-and-forget and the log is pulled by polling.

pub mod command;
pub mod dispatch;
pub mod poll;
pub mod probe;
pub mod target;

pub use command::{Command, Mode};
pub use dispatch::{dispatch, Config};
pub use poll::{Outcome, PollConfig, PollStats};
pub use probe::{probe, ProbeError, PROBE_TIMEOUT};
pub use target::{Target, DEVICE_PORT};
