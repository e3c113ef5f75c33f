//! Spatial-input (6-DoF puck) adapter.
//!
//! Each frame carries a linear and an angular 3-vector already expressed in
//! the device's world-aligned output frame, so no conjugation is needed:
//! translation adds directly and rotation composes in world frame.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use teleos_types::{Quaternion, RotationFrame, Vec3};

use crate::engine::PoseFusionEngine;
use crate::modes::InputModes;

/// Sensitivity of the spatial-input path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialSettings {
    /// Metres per unit of linear deflection.
    pub linear_scale: f64,
    /// Radians per unit of angular deflection.
    pub angular_scale: f64,
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            linear_scale: 0.002,
            angular_scale: 0.005,
        }
    }
}

/// Translates 6-DoF twist frames into world-frame goal increments.
pub struct SpatialInputAdapter {
    engine: Arc<PoseFusionEngine>,
    modes: Arc<InputModes>,
    settings: SpatialSettings,
}

impl SpatialInputAdapter {
    pub fn new(
        engine: Arc<PoseFusionEngine>,
        modes: Arc<InputModes>,
        settings: SpatialSettings,
    ) -> Self {
        Self {
            engine,
            modes,
            settings,
        }
    }

    /// Handle one twist frame.
    pub fn handle(&self, linear: Vec3, angular: Vec3) {
        if !self.modes.spatial() {
            return;
        }
        self.engine
            .apply_translation(linear.scale(self.settings.linear_scale));
        let delta =
            Quaternion::from_rotation_vector(angular.scale(self.settings.angular_scale));
        self.engine.apply_rotation(delta, RotationFrame::World);
    }
}
