//! `teleos-runtime` – orchestration.
//!
//! Glues the fusion core to the event bus and to the external controller
//! boundaries.
//!
//! # Modules
//!
//! - [`node`] – [`TeleopNode`][node::TeleopNode]: builds the adapters and
//!   runs the device-dispatch, feedback, and fixed-rate goal-publication
//!   tasks.
//! - [`gateway`] – [`BusStiffnessGateway`][gateway::BusStiffnessGateway]:
//!   bus-backed implementation of the stiffness gateway port.
//! - [`telemetry`] – `tracing` subscriber bootstrap.

pub mod gateway;
pub mod node;
pub mod telemetry;

pub use gateway::BusStiffnessGateway;
pub use node::{TeleopNode, TeleopNodeConfig};
pub use telemetry::init_tracing;
