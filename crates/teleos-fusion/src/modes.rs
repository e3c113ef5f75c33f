//! Per-device enable flags.
//!
//! Four independent booleans, one per input source.  There is deliberately no
//! mutual exclusion: enabling several sources at once is legal and their
//! deltas simply accumulate in the same tick window.  The flags are lock-free
//! atomics because they sit on the hot path of every device event.

use std::sync::atomic::{AtomicBool, Ordering};

/// Which input sources currently contribute to the fused pose.
///
/// All sources start disabled; the operator toggles them with the `1`–`4`
/// command keys.
#[derive(Debug, Default)]
pub struct InputModes {
    keyboard: AtomicBool,
    pointer: AtomicBool,
    spatial: AtomicBool,
    gamepad: AtomicBool,
}

impl InputModes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyboard(&self) -> bool {
        self.keyboard.load(Ordering::Relaxed)
    }

    pub fn pointer(&self) -> bool {
        self.pointer.load(Ordering::Relaxed)
    }

    pub fn spatial(&self) -> bool {
        self.spatial.load(Ordering::Relaxed)
    }

    pub fn gamepad(&self) -> bool {
        self.gamepad.load(Ordering::Relaxed)
    }

    /// Flip the keyboard flag; returns the new value.
    pub fn toggle_keyboard(&self) -> bool {
        !self.keyboard.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn toggle_pointer(&self) -> bool {
        !self.pointer.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn toggle_spatial(&self) -> bool {
        !self.spatial.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn toggle_gamepad(&self) -> bool {
        !self.gamepad.fetch_xor(true, Ordering::Relaxed)
    }
}
