//! Keyboard adapter: fixed-step jogging plus the command-key surface.
//!
//! The key map is the operator contract and must stay stable:
//!
//! | Key | Effect |
//! |---|---|
//! | `1`–`4` | toggle keyboard / pointer / spatial / gamepad input |
//! | `0` | stiffness off (goal then tracks the measured pose) |
//! | `9` | reset goal to current pose, stiffness on |
//! | `n` / `j` | nullspace stiffness on / off (keyboard mode only) |
//! | `w`/`s` `a`/`d` `q`/`z` | ±x, ±y, ±z translation steps (keyboard mode only) |
//! | `h`/`f` `t`/`g` `r`/`y` | ±x, ±y, ±z world-frame rotation steps (keyboard mode only) |
//!
//! `a` increases y and `d` decreases it — inverted relative to the mnemonic
//! letters to match the right-handed base frame as seen from the operator.
//!
//! A global suspend flag freezes the whole surface: while set, every key
//! event is discarded before any other handling, command keys included.

use std::f64::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use teleos_types::{Quaternion, RotationFrame, Vec3};
use tracing::{debug, info};

use crate::engine::PoseFusionEngine;
use crate::modes::InputModes;

/// Step sizes for keyboard jogging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    /// Translation per key press (metres).
    pub step: f64,
    /// Rotation per key press (radians).
    pub rot_step: f64,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            step: 0.01,
            rot_step: PI / 40.0,
        }
    }
}

/// Translates key presses into engine calls, mode toggles, and stiffness
/// commands.
pub struct KeyAdapter {
    engine: Arc<PoseFusionEngine>,
    modes: Arc<InputModes>,
    suspended: Arc<AtomicBool>,
    settings: KeySettings,
}

impl KeyAdapter {
    pub fn new(
        engine: Arc<PoseFusionEngine>,
        modes: Arc<InputModes>,
        suspended: Arc<AtomicBool>,
        settings: KeySettings,
    ) -> Self {
        Self {
            engine,
            modes,
            suspended,
            settings,
        }
    }

    /// Handle one key press.  Unknown keys and jog keys outside keyboard
    /// mode are silently ignored; they are expected and frequent.
    pub fn handle(&self, key: char) {
        if self.suspended.load(Ordering::Relaxed) {
            debug!(key = %key, "key input suspended; discarding");
            return;
        }

        match key {
            '1' => {
                let on = self.modes.toggle_keyboard();
                info!(enabled = on, "keyboard input toggled");
            }
            '2' => {
                let on = self.modes.toggle_pointer();
                info!(enabled = on, "pointer input toggled");
            }
            '3' => {
                let on = self.modes.toggle_spatial();
                info!(enabled = on, "spatial input toggled");
            }
            '4' => {
                let on = self.modes.toggle_gamepad();
                info!(enabled = on, "gamepad input toggled");
            }
            '0' => self.engine.stiffness_off(),
            '9' => self.engine.stiffness_on(),
            _ => self.handle_jog(key),
        }
    }

    fn handle_jog(&self, key: char) {
        if !self.modes.keyboard() {
            return;
        }
        let step = self.settings.step;
        match key {
            'n' => self.engine.set_nullspace(true),
            'j' => self.engine.set_nullspace(false),
            'w' => self.translate(Vec3::new(step, 0.0, 0.0)),
            's' => self.translate(Vec3::new(-step, 0.0, 0.0)),
            'a' => self.translate(Vec3::new(0.0, step, 0.0)),
            'd' => self.translate(Vec3::new(0.0, -step, 0.0)),
            'q' => self.translate(Vec3::new(0.0, 0.0, step)),
            'z' => self.translate(Vec3::new(0.0, 0.0, -step)),
            'h' => self.rotate(Vec3::new(1.0, 0.0, 0.0)),
            'f' => self.rotate(Vec3::new(-1.0, 0.0, 0.0)),
            't' => self.rotate(Vec3::new(0.0, 1.0, 0.0)),
            'g' => self.rotate(Vec3::new(0.0, -1.0, 0.0)),
            'r' => self.rotate(Vec3::new(0.0, 0.0, 1.0)),
            'y' => self.rotate(Vec3::new(0.0, 0.0, -1.0)),
            _ => {}
        }
    }

    fn translate(&self, delta: Vec3) {
        self.engine.apply_translation(delta);
    }

    fn rotate(&self, axis: Vec3) {
        let delta = Quaternion::from_rotation_vector(axis.scale(self.settings.rot_step));
        self.engine.apply_rotation(delta, RotationFrame::World);
    }
}
