//! # ZMS Control Library
//!
//! Control core of the Zoomers robot: remote link supervision, host bridge
//! instruction handling and the fixed-cadence poll loop driving them.
//!
//! ## Module Structure
//!
//! - [`link`] - remote link watchdog with edge-triggered failsafe
//! - [`remote`] - remote datagram demultiplexer
//! - [`service`] - bridge dispatch, joystick mapping, log relay
//! - [`cycle`] - poll loop with timing statistics
//! - [`log_relay`] - `tracing` layer queueing log lines for the host
//! - [`transport`] - TCP bridge stream and UDP remote listener
//!
//! ## Threads
//!
//! The poll loop owns the [`service::Service`]. The UDP remote thread only
//! touches the shared [`link::LinkSupervisor`]. Encoder counts are updated
//! from edge interrupts through atomics.

#![warn(missing_docs)]

pub mod cycle;
pub mod link;
pub mod log_relay;
pub mod remote;
pub mod service;
pub mod transport;

pub use crate::cycle::{CycleRunner, CycleStats};
pub use crate::link::{LinkHandler, LinkState, LinkSupervisor};
pub use crate::log_relay::LogQueue;
pub use crate::remote::RemoteDemux;
pub use crate::service::Service;
