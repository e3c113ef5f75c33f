//! Device adapters: one per input source.
//!
//! Each adapter translates a raw [`DeviceEvent`][teleos_types::DeviceEvent]
//! variant plus the current pose into an incremental update on the
//! [`PoseFusionEngine`][crate::engine::PoseFusionEngine], gated by its
//! [`InputModes`][crate::modes::InputModes] flag.  All semantic knowledge —
//! step sizes, frame conventions, axis inversions, dead-zones, clamps —
//! lives here, never in the event types or the transport.

pub mod gamepad;
pub mod key;
pub mod pointer;
pub mod spatial;

pub use gamepad::{GamepadAdapter, GamepadSettings};
pub use key::{KeyAdapter, KeySettings};
pub use pointer::{PointerAdapter, PointerSettings};
pub use spatial::{SpatialInputAdapter, SpatialSettings};
