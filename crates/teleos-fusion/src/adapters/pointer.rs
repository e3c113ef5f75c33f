//! Pointer (mouse) adapter: planar translation from relative motion.
//!
//! The pointer reports absolute screen samples; the adapter keeps the
//! previous sample as a baseline and derives the relative motion itself.
//! Screen axes are swapped and negated into the robot base frame (+screen-x
//! maps to −robot-y, +screen-y to −robot-x) — the convention of a robot
//! facing the operator's viewing direction.  The inversion pair is
//! configurable because it depends on how the robot is mounted relative to
//! the camera.
//!
//! Each per-axis delta is clamped to ±`clamp` device units before scaling so
//! a pointer warp (e.g. the cursor jumping across screens) cannot fling the
//! goal.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use teleos_types::Vec3;
use tracing::trace;

use crate::engine::PoseFusionEngine;
use crate::modes::InputModes;

/// Scaling and calibration for the pointer path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerSettings {
    /// Per-axis clamp on the raw delta, in device units.
    pub clamp: f64,
    /// Metres per clamped device unit of motion.
    pub scale: f64,
    /// Metres of z per scroll-wheel step.
    pub scroll_scale: f64,
    /// Negate the screen-y → robot-x mapping (default true).
    pub invert_x: bool,
    /// Negate the screen-x → robot-y mapping (default true).
    pub invert_y: bool,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            clamp: 3.0,
            scale: 0.001,
            scroll_scale: 0.01,
            invert_x: true,
            invert_y: true,
        }
    }
}

/// Translates pointer motion and scroll into planar goal translation.
pub struct PointerAdapter {
    engine: Arc<PoseFusionEngine>,
    modes: Arc<InputModes>,
    settings: PointerSettings,
    /// Last absolute sample; `None` until the first move after enabling.
    prev: Mutex<Option<(f64, f64)>>,
}

impl PointerAdapter {
    pub fn new(
        engine: Arc<PoseFusionEngine>,
        modes: Arc<InputModes>,
        settings: PointerSettings,
    ) -> Self {
        Self {
            engine,
            modes,
            settings,
            prev: Mutex::new(None),
        }
    }

    /// Handle one absolute position sample.
    ///
    /// While pointer mode is disabled the baseline is cleared, so the first
    /// movement after re-enabling only establishes a new baseline and
    /// produces no delta.
    pub fn handle_move(&self, x: f64, y: f64) {
        let mut prev = self.prev.lock().unwrap_or_else(|e| e.into_inner());
        if !self.modes.pointer() {
            *prev = None;
            return;
        }
        let Some((px, py)) = prev.replace((x, y)) else {
            trace!("pointer baseline established");
            return;
        };

        // Screen axes swapped into the base frame, then optionally negated.
        let mut dx = y - py;
        let mut dy = x - px;
        if self.settings.invert_x {
            dx = -dx;
        }
        if self.settings.invert_y {
            dy = -dy;
        }
        let clamp = self.settings.clamp;
        let dx = dx.clamp(-clamp, clamp);
        let dy = dy.clamp(-clamp, clamp);

        self.engine.apply_translation(Vec3::new(
            dx * self.settings.scale,
            dy * self.settings.scale,
            0.0,
        ));
    }

    /// Handle one scroll step.  The wheel axis (`dy`) drives z; the thumb
    /// axis (`dx`) is ignored.
    pub fn handle_scroll(&self, _dx: f64, dy: f64) {
        if !self.modes.pointer() {
            return;
        }
        self.engine
            .apply_translation(Vec3::new(0.0, 0.0, dy * self.settings.scroll_scale));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stiffness::{StiffnessGateway, StiffnessLimits};
    use teleos_types::{Pose, StiffnessGains, TeleopError};

    struct NullGateway;

    impl StiffnessGateway for NullGateway {
        fn set_stiffness(&self, _: &StiffnessGains) -> Result<(), TeleopError> {
            Ok(())
        }
    }

    fn rig() -> (PointerAdapter, Arc<PoseFusionEngine>, Arc<InputModes>) {
        let engine = Arc::new(PoseFusionEngine::new(
            StiffnessLimits::default(),
            Arc::new(NullGateway),
        ));
        engine.feedback(Pose::identity());
        engine.reset_to_current();
        let modes = Arc::new(InputModes::new());
        let adapter = PointerAdapter::new(engine.clone(), modes.clone(), PointerSettings::default());
        (adapter, engine, modes)
    }

    #[test]
    fn disabled_mode_leaves_pose_unchanged() {
        let (adapter, engine, _) = rig();
        let before = engine.snapshot();
        adapter.handle_move(100.0, 100.0);
        adapter.handle_move(150.0, 150.0);
        adapter.handle_scroll(0.0, 5.0);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn first_move_only_establishes_baseline() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        let before = engine.snapshot();
        adapter.handle_move(400.0, 300.0);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn motion_is_swapped_negated_and_scaled() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        adapter.handle_move(400.0, 300.0);
        // +3 screen-x, +1 screen-y → dx = -1, dy = -3.
        adapter.handle_move(403.0, 301.0);
        let goal = engine.snapshot().unwrap();
        assert!((goal.position.x - (-0.001)).abs() < 1e-12);
        assert!((goal.position.y - (-0.003)).abs() < 1e-12);
        assert_eq!(goal.position.z, 0.0);
    }

    #[test]
    fn consecutive_moves_measure_from_the_previous_sample() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        adapter.handle_move(0.0, 0.0);
        adapter.handle_move(0.0, -1.0);
        adapter.handle_move(0.0, -2.0);
        // Two steps of screen-dy = -1 → dx = +1 each.
        let goal = engine.snapshot().unwrap();
        assert!((goal.position.x - 0.002).abs() < 1e-12);
    }

    #[test]
    fn warp_is_clamped_per_component() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        adapter.handle_move(0.0, 0.0);
        // A 1000-unit jump must contribute at most clamp (3) units per axis.
        adapter.handle_move(1000.0, -1000.0);
        let goal = engine.snapshot().unwrap();
        assert!((goal.position.x - 0.003).abs() < 1e-12);
        assert!((goal.position.y - (-0.003)).abs() < 1e-12);
    }

    #[test]
    fn disabling_clears_the_baseline() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        adapter.handle_move(100.0, 100.0);

        modes.toggle_pointer(); // off
        adapter.handle_move(500.0, 500.0);
        modes.toggle_pointer(); // on again

        let before = engine.snapshot();
        // First move after re-enabling: baseline only, no delta from the
        // stale (100, 100) sample.
        adapter.handle_move(600.0, 600.0);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn scroll_wheel_drives_z_only() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        adapter.handle_scroll(0.0, 2.0);
        let goal = engine.snapshot().unwrap();
        assert!((goal.position.z - 0.02).abs() < 1e-12);
        assert_eq!(goal.position.x, 0.0);
        assert_eq!(goal.position.y, 0.0);
    }

    #[test]
    fn horizontal_scroll_is_ignored() {
        let (adapter, engine, modes) = rig();
        modes.toggle_pointer();
        let before = engine.snapshot();
        adapter.handle_scroll(5.0, 0.0);
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn inversion_flags_flip_the_mapping() {
        let engine = Arc::new(PoseFusionEngine::new(
            StiffnessLimits::default(),
            Arc::new(NullGateway),
        ));
        engine.feedback(Pose::identity());
        engine.reset_to_current();
        let modes = Arc::new(InputModes::new());
        modes.toggle_pointer();
        let adapter = PointerAdapter::new(
            engine.clone(),
            modes,
            PointerSettings {
                invert_x: false,
                invert_y: false,
                ..PointerSettings::default()
            },
        );

        adapter.handle_move(0.0, 0.0);
        adapter.handle_move(3.0, 1.0);
        let goal = engine.snapshot().unwrap();
        assert!((goal.position.x - 0.001).abs() < 1e-12);
        assert!((goal.position.y - 0.003).abs() < 1e-12);
    }
}
