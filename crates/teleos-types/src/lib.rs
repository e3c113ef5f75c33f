//! `teleos-types` – shared data model for the TeleOS teleoperation stack.
//!
//! Defines the vocabulary every crate speaks: poses and quaternion math
//! ([`math`]), raw device events, the seven-gain stiffness vector pushed to
//! the compliance controller, the event envelope routed over the internal
//! bus, and the global error type.

pub mod math;

pub use math::{Pose, Quaternion, RotationFrame, Vec3};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Raw signal from one input device, before any semantic interpretation.
///
/// Scaling, frame conventions, dead-zones, and axis inversions all live in
/// the per-device adapters; an event carries only what the hardware reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device", content = "payload")]
pub enum DeviceEvent {
    /// A single recognised key press.
    KeyPress(char),
    /// An absolute pointer position sample in screen coordinates.  The
    /// adapter keeps the previous sample and derives the relative motion.
    PointerMove { x: f64, y: f64 },
    /// A scroll step.  `dy` is the wheel axis, `dx` the thumb axis.
    PointerScroll { dx: f64, dy: f64 },
    /// One frame from the 6-DoF spatial input device, already expressed in
    /// its world-aligned output frame.
    SpatialTwist { linear: Vec3, angular: Vec3 },
    /// One gamepad sample.  The contract is exactly 8 ordered axes; see the
    /// gamepad adapter for the index layout.
    GamepadFrame { axes: Vec<f64> },
}

/// The seven compliance gains accepted by the stiffness gateway.
///
/// Field names match the gateway's configuration keys one-to-one; writes are
/// independent scalars, no atomic multi-field commit is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessGains {
    pub translational_x: f64,
    pub translational_y: f64,
    pub translational_z: f64,
    pub rotational_x: f64,
    pub rotational_y: f64,
    pub rotational_z: f64,
    pub nullspace: f64,
}

impl StiffnessGains {
    /// Equal gains per task-space group plus a nullspace gain.
    pub fn uniform(translational: f64, rotational: f64, nullspace: f64) -> Self {
        Self {
            translational_x: translational,
            translational_y: translational,
            translational_z: translational,
            rotational_x: rotational,
            rotational_y: rotational,
            rotational_z: rotational,
            nullspace,
        }
    }

    /// All seven gains at zero (compliance fully off).
    pub fn zero() -> Self {
        Self::uniform(0.0, 0.0, 0.0)
    }
}

/// Envelope for every message routed over the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"teleos-cli::keys"` or `"teleos-runtime::publisher"`.
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Stamp a payload with a fresh id and the current wall-clock time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that cross the internal event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// A raw device sample heading for the adapters.
    Device(DeviceEvent),
    /// The arm's measured end-effector pose from the pose sensor.
    Feedback(Pose),
    /// The fused equilibrium pose, published on the fixed tick.
    Goal(Pose),
    /// A seven-gain write heading for the compliance-parameter service.
    Stiffness(StiffnessGains),
}

/// Errors spanning the input boundary, the event bus, and configuration.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TeleopError {
    #[error("malformed gamepad frame: expected {expected} axes, got {got}")]
    MalformedFrame { expected: usize, got: usize },

    #[error("event bus error: {0}")]
    Channel(String),

    #[error("stiffness gateway error: {0}")]
    Gateway(String),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_event_serialization_roundtrip() {
        let event = DeviceEvent::SpatialTwist {
            linear: Vec3::new(0.1, -0.2, 0.3),
            angular: Vec3::new(0.0, 0.5, 0.0),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DeviceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn gamepad_frame_roundtrip_preserves_axis_order() {
        let event = DeviceEvent::GamepadFrame {
            axes: vec![0.2, 0.0, 0.0, -0.4, 0.9, 0.0, 1.0, -1.0],
        };
        let json = serde_json::to_string(&event).unwrap();
        match serde_json::from_str(&json).unwrap() {
            DeviceEvent::GamepadFrame { axes } => {
                assert_eq!(axes.len(), 8);
                assert!((axes[4] - 0.9).abs() < f64::EPSILON);
            }
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn event_envelope_roundtrip() {
        let event = Event::new(
            "teleos-cli::keys",
            EventPayload::Device(DeviceEvent::KeyPress('w')),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event.id, back.id);
        assert_eq!(event.source, back.source);
    }

    #[test]
    fn goal_payload_roundtrip() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quaternion::identity());
        let event = Event::new("teleos-runtime::publisher", EventPayload::Goal(pose));
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        match back.payload {
            EventPayload::Goal(p) => assert_eq!(p, pose),
            _ => panic!("unexpected payload"),
        }
    }

    #[test]
    fn stiffness_gains_zero_and_uniform() {
        let zero = StiffnessGains::zero();
        assert_eq!(zero.translational_x, 0.0);
        assert_eq!(zero.nullspace, 0.0);

        let full = StiffnessGains::uniform(600.0, 30.0, 1.0);
        assert_eq!(full.translational_z, 600.0);
        assert_eq!(full.rotational_y, 30.0);
        assert_eq!(full.nullspace, 1.0);
    }

    #[test]
    fn teleop_error_display() {
        let err = TeleopError::MalformedFrame {
            expected: 8,
            got: 6,
        };
        assert!(err.to_string().contains("expected 8 axes, got 6"));

        let err2 = TeleopError::Channel("no subscribers".to_string());
        assert!(err2.to_string().contains("no subscribers"));
    }
}
