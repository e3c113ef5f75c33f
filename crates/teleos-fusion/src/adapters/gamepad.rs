//! Gamepad adapter: local-frame jogging from stick and directional axes.
//!
//! Axis contract (8-element ordered array):
//!
//! | Index | Meaning |
//! |---|---|
//! | 0, 1 | left-stick X/Y – local-frame displacement |
//! | 3, 4 | right-stick X/Y – local-frame rotation (read Y-then-X) |
//! | 6 | directional pad horizontal – local yaw |
//! | 7 | directional pad vertical – local z displacement |
//!
//! Unlike the other devices, the gamepad is authored in the end-effector's
//! own frame: the operator pushes "forward" relative to the gripper, so both
//! the displacement and the rotation are conjugated by the current goal
//! orientation before composing.  The per-axis world gains are applied after
//! that transform.
//!
//! Each 2-D stick group passes through its own Euclidean dead-zone — the
//! device-level dead-zones proved unreliable, so they are re-applied here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use teleos_types::{Quaternion, TeleopError, Vec3};

use crate::engine::PoseFusionEngine;
use crate::modes::InputModes;

/// Number of axes a well-formed frame must carry.
pub const AXIS_COUNT: usize = 8;

/// Dead-zone, sensitivities, and world gains for the gamepad path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadSettings {
    /// Euclidean dead-zone radius applied per 2-D stick group.
    pub dead_zone: f64,
    /// Radians per unit of right-stick deflection.
    pub rot_scale: f64,
    /// Radians per unit of directional-pad yaw input.
    pub yaw_scale: f64,
    /// Per-axis gains applied to the world-frame displacement (metres per
    /// unit of deflection).
    pub world_gains: Vec3,
}

impl Default for GamepadSettings {
    fn default() -> Self {
        Self {
            dead_zone: 0.15,
            rot_scale: 0.005,
            yaw_scale: 0.015,
            world_gains: Vec3::new(0.001, 0.001, 0.002),
        }
    }
}

/// Translates gamepad frames into one atomic local-frame twist per sample.
pub struct GamepadAdapter {
    engine: Arc<PoseFusionEngine>,
    modes: Arc<InputModes>,
    settings: GamepadSettings,
}

impl GamepadAdapter {
    pub fn new(
        engine: Arc<PoseFusionEngine>,
        modes: Arc<InputModes>,
        settings: GamepadSettings,
    ) -> Self {
        Self {
            engine,
            modes,
            settings,
        }
    }

    /// Handle one axis frame.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::MalformedFrame`] when the array is not exactly
    /// [`AXIS_COUNT`] long; the pose is left unchanged.
    pub fn handle(&self, axes: &[f64]) -> Result<(), TeleopError> {
        if !self.modes.gamepad() {
            return Ok(());
        }
        if axes.len() != AXIS_COUNT {
            return Err(TeleopError::MalformedFrame {
                expected: AXIS_COUNT,
                got: axes.len(),
            });
        }

        let (disp_x, disp_y) = dead_zoned(axes[0], axes[1], self.settings.dead_zone);
        // Right stick reads Y-then-X.
        let (rot_y, rot_x) = dead_zoned(axes[4], axes[3], self.settings.dead_zone);

        let disp_local = Vec3::new(-disp_x, -disp_y, axes[7]);
        let rot_vector = Vec3::new(
            rot_x * self.settings.rot_scale,
            rot_y * self.settings.rot_scale,
            axes[6] * self.settings.yaw_scale,
        );
        let rot_local = Quaternion::from_rotation_vector(rot_vector);

        self.engine
            .apply_local_twist(disp_local, rot_local, self.settings.world_gains);
        Ok(())
    }
}

/// Zero both components of a 2-D group whose Euclidean norm is inside the
/// dead-zone.
fn dead_zoned(a: f64, b: f64, dead_zone: f64) -> (f64, f64) {
    if (a * a + b * b).sqrt() < dead_zone {
        (0.0, 0.0)
    } else {
        (a, b)
    }
}
