//! Zoomers Common Library
//!
//! This crate provides the types shared by every Zoomers workspace crate:
//! settings records, board capability traits, remote-control packets and the
//! binary bridge protocol spoken between the robot and a host.
//!
//! # Module Structure
//!
//! - [`config`] - TOML configuration loading, log level, shared config
//! - [`consts`] - Workspace-wide numeric limits and defaults
//! - [`hal`] - Board capability traits and hardware errors
//! - [`settings`] - Validated per-device settings records
//! - [`remote`] - Remote controller packets and datagram demultiplexing
//! - [`bridge`] - Opcode-framed instruction/telemetry protocol
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! zms_common = { path = "../zms_common" }
//! ```
//!
//! ```rust
//! use zms_common::prelude::*;
//! ```

pub mod bridge;
pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod remote;
pub mod settings;
