//! ARC HAL Library
//!
//! Low-level primitives for multi-core ARC processors: the atomic
//! operation layer the kernel builds its counters, locks and reference
//! counts on, and the controller for the cluster-level shared cache.
//!
//! # Architecture
//!
//! - `atomic`: one portable API over four hardware strategies (LL/SC retry
//!   loops, single-instruction atomics, the vendor NPS extension and a
//!   global-lock emulation). The strategy is fixed at build time by a Cargo
//!   feature; every backend stays available as a type for testing.
//! - `cluster`: boot-time cluster discovery and SCM maintenance (enable,
//!   range and whole-cache clean/invalidate) through the indirect cluster
//!   register window.
//! - `arch`: barriers, interrupt save/restore and aux register access.
//!
//! # Safety
//!
//! Register access is the only unsafe code; it is confined to
//! `arch::aux_regs` and documented at each use.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_docs)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::panic)]
#![warn(clippy::unwrap_used)]

#[macro_use]
pub mod macros;

pub mod arch;
pub mod atomic;
pub mod cluster;
pub mod config;

#[doc(hidden)]
pub use log;

pub use atomic::{ActiveBackend, AluOp, AtomicWord, Backend};
pub use cluster::{Cluster, ClusterError, ClusterResult};
pub use config::{BACKEND_NAME, ClusterConfig, PollPolicy};
