//! Disconnect watchdog for mirror.
//!
//! When the device goes away unexpectedly, the screen shows a
//! "disconnected" icon and closes after a timeout unless the user closes
//! it first. This crate provides the pieces for that:
//!
//! - [`TimedLatch`]: a one-way flag that can be waited on with a deadline.
//! - [`DisconnectMonitor`]: a worker thread that loads the icon, reports
//!   it, then races the deadline against [`DisconnectMonitor::interrupt`].
//! - [`IconLoader`] / [`FileIconLoader`]: where the icon comes from.

mod error;
mod icon;
mod latch;
mod listener;
mod monitor;

pub use error::{DisconnectError, IconError};
pub use icon::{FileIconLoader, IconLoader, ICON_DIR_ENV, ICON_FILENAME_DISCONNECTED};
pub use latch::{TimedLatch, WaitOutcome};
pub use listener::DisconnectListener;
pub use monitor::{DisconnectMonitor, Interrupter, JoinedMonitor, MonitorOutcome, MonitorState};

/// Name given to the monitor's worker thread.
pub const WORKER_THREAD_NAME: &str = "mirror-disconnect";

/// Result type for disconnect monitor operations.
pub type DisconnectResult<T> = Result<T, DisconnectError>;

/// Result type for icon loading.
pub type IconResult<T> = Result<T, IconError>;
