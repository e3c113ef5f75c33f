//! `teleos-fusion` – the pose-fusion core.
//!
//! Fuses asynchronous input from heterogeneous devices into one continuously
//! updated 6-DoF equilibrium pose for a compliant motion controller, and
//! drives the stiffness state machine that accompanies it.
//!
//! # Modules
//!
//! - [`engine`] – [`PoseFusionEngine`][engine::PoseFusionEngine]: exclusive,
//!   mutex-guarded owner of the goal pose and stiffness profile; all device
//!   mutations are serialised through it.
//! - [`adapters`] – one adapter per input source (keyboard, pointer,
//!   spatial input, gamepad); each converts raw signals into incremental
//!   world- or local-frame deltas.
//! - [`stiffness`] – the `Full`/`Zero` stiffness state machine and the
//!   [`StiffnessGateway`][stiffness::StiffnessGateway] port to the external
//!   compliance-parameter service.
//! - [`modes`] – the four independent per-device enable flags.

pub mod adapters;
pub mod engine;
pub mod modes;
pub mod stiffness;

pub use adapters::{
    GamepadAdapter, GamepadSettings, KeyAdapter, KeySettings, PointerAdapter, PointerSettings,
    SpatialInputAdapter, SpatialSettings,
};
pub use engine::PoseFusionEngine;
pub use modes::InputModes;
pub use stiffness::{StiffnessGateway, StiffnessLimits, StiffnessProfile, StiffnessState};
