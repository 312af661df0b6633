//! Runtime core: orchestration and lifecycle.
//!
//! The public entry point is [`Runtime`], which wires the pipeline, drives the
//! task actors, and decides between graceful shutdown and process restart.
//!
//! Internal modules:
//! - [`runtime`]: spawns actors and the watchdog, handles shutdown and restart;
//! - [`actor`]: drives a single task at a fixed period;
//! - [`reboot`]: the single-shot restart request and process re-exec;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`builder`]: validated construction of a [`Runtime`].

mod actor;
mod builder;
mod config;
mod reboot;
mod runtime;
mod shutdown;

pub use builder::RuntimeBuilder;
pub use config::Config;
pub use reboot::{restart_process, Reboot, RestartCause, RESTART_EXIT_CODE};
pub use runtime::{Exit, Runtime};
