//! [`PoseFusionEngine`] – the single owner of the fused equilibrium pose.
//!
//! Every device adapter funnels its incremental update through one of the
//! engine's entry points; the engine serialises them behind a single mutex so
//! no two read-modify-writes on the orientation can ever interleave.  The
//! mutation bodies are O(1) arithmetic, so one coarse lock over the whole
//! fused state (goal pose, latest feedback, stiffness profile) is both
//! sufficient and simpler than fine-grained locking.
//!
//! The goal pose starts undefined.  It becomes meaningful the first time a
//! feedback sample is copied into it (via [`PoseFusionEngine::reset_to_current`]
//! or the continuous zero-stiffness tracking in [`PoseFusionEngine::feedback`]);
//! until then every incremental update is a no-op, because composing a delta
//! against an undefined orientation would be a frame error.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use teleos_fusion::engine::PoseFusionEngine;
//! use teleos_fusion::stiffness::{StiffnessGateway, StiffnessLimits};
//! use teleos_types::{Pose, StiffnessGains, TeleopError, Vec3};
//!
//! struct NullGateway;
//! impl StiffnessGateway for NullGateway {
//!     fn set_stiffness(&self, _: &StiffnessGains) -> Result<(), TeleopError> {
//!         Ok(())
//!     }
//! }
//!
//! let engine = PoseFusionEngine::new(StiffnessLimits::default(), Arc::new(NullGateway));
//! engine.feedback(Pose::identity());
//! engine.reset_to_current();
//! engine.apply_translation(Vec3::new(0.01, 0.0, 0.0));
//! assert!((engine.snapshot().unwrap().position.x - 0.01).abs() < 1e-12);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use teleos_types::{Pose, Quaternion, RotationFrame, Vec3};
use tracing::{debug, info, warn};

use crate::stiffness::{StiffnessGateway, StiffnessLimits, StiffnessProfile, StiffnessState};

// ────────────────────────────────────────────────────────────────────────────
// Inner state
// ────────────────────────────────────────────────────────────────────────────

struct FusedState {
    /// The equilibrium pose.  `None` until the first feedback-driven reset.
    goal: Option<Pose>,
    /// Latest measured end-effector pose from the feedback sink.
    current: Option<Pose>,
    stiffness: StiffnessProfile,
}

// ────────────────────────────────────────────────────────────────────────────
// PoseFusionEngine
// ────────────────────────────────────────────────────────────────────────────

/// Exclusive owner of the equilibrium pose and stiffness profile.
///
/// All methods take `&self`; mutual exclusion is internal.  Gateway pushes
/// happen after the state lock is released so a slow transport can never
/// stall an adapter.
pub struct PoseFusionEngine {
    state: Mutex<FusedState>,
    gateway: Arc<dyn StiffnessGateway>,
}

impl PoseFusionEngine {
    pub fn new(limits: StiffnessLimits, gateway: Arc<dyn StiffnessGateway>) -> Self {
        Self {
            state: Mutex::new(FusedState {
                goal: None,
                current: None,
                stiffness: StiffnessProfile::new(limits),
            }),
            gateway,
        }
    }

    // The fused state stays internally consistent across any panic point, so
    // a poisoned lock is recoverable.
    fn locked(&self) -> MutexGuard<'_, FusedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ────────────────────────────────────────────────────────────────────
    // Pose mutation
    // ────────────────────────────────────────────────────────────────────

    /// Add a world-frame translation to the goal position.
    pub fn apply_translation(&self, delta: Vec3) {
        let mut st = self.locked();
        if let Some(goal) = st.goal.as_mut() {
            goal.position = goal.position.add(delta);
        }
    }

    /// Compose an incremental rotation into the goal orientation.
    ///
    /// World deltas left-multiply directly.  Local deltas are first expressed
    /// in world frame by sandwiching with the current orientation, then
    /// left-multiplied.  The result is renormalised either way.
    pub fn apply_rotation(&self, delta: Quaternion, frame: RotationFrame) {
        let mut st = self.locked();
        if let Some(goal) = st.goal.as_mut() {
            let world_delta = match frame {
                RotationFrame::World => delta,
                RotationFrame::Local => goal
                    .orientation
                    .mul(delta)
                    .mul(goal.orientation.conjugate())
                    .normalized(),
            };
            goal.orientation = world_delta.mul(goal.orientation).normalized();
        }
    }

    /// Apply a local-frame displacement and rotation in one atomic
    /// read-modify-write: the current orientation is read once and used for
    /// both conjugations, so no other adapter can slip in between.
    ///
    /// `gains` scales the displacement per axis *after* it has been rotated
    /// into world frame.
    pub fn apply_local_twist(&self, translation: Vec3, rotation: Quaternion, gains: Vec3) {
        let mut st = self.locked();
        if let Some(goal) = st.goal.as_mut() {
            let orientation = goal.orientation;
            let world_disp = orientation.rotate(translation);
            goal.position = goal.position.add(world_disp.hadamard(gains));

            let world_rot = orientation
                .mul(rotation)
                .mul(orientation.conjugate())
                .normalized();
            goal.orientation = world_rot.mul(orientation).normalized();
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Feedback & reset
    // ────────────────────────────────────────────────────────────────────

    /// Record a measured pose sample from the feedback sink.
    ///
    /// While stiffness is `Zero` the goal is overwritten with the sample
    /// unconditionally (an exact copy, not a filtered blend) so the goal can
    /// never diverge from the arm while compliance is off.
    pub fn feedback(&self, sample: Pose) {
        let mut st = self.locked();
        st.current = Some(sample);
        if st.stiffness.is_zero() {
            st.goal = Some(sample);
        }
    }

    /// Overwrite the goal with the latest measured pose.
    ///
    /// The only operation that discards history instead of composing with
    /// it.  A no-op (returning `false`) when no feedback sample has ever
    /// arrived: resetting to an undefined pose would be worse than not
    /// resetting at all.
    pub fn reset_to_current(&self) -> bool {
        let mut st = self.locked();
        match st.current {
            Some(current) => {
                st.goal = Some(current);
                true
            }
            None => {
                debug!("reset requested before any feedback sample; ignoring");
                false
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Stiffness transitions
    // ────────────────────────────────────────────────────────────────────

    /// Engage full stiffness, resetting the goal to the current measured
    /// pose first so the controller has nothing to jump to.
    pub fn stiffness_on(&self) {
        let gains = {
            let mut st = self.locked();
            if let Some(current) = st.current {
                st.goal = Some(current);
            } else {
                debug!("stiffness engaged before any feedback sample; goal left unset");
            }
            st.stiffness.engage()
        };
        info!("stiffness on; goal reset to current pose");
        self.push_gains(&gains);
    }

    /// Drop all seven gains to zero.  The goal is not reset here; it tracks
    /// the measured pose continuously via [`PoseFusionEngine::feedback`]
    /// while stiffness stays off.
    pub fn stiffness_off(&self) {
        let gains = {
            let mut st = self.locked();
            st.stiffness.disengage()
        };
        info!("stiffness off");
        self.push_gains(&gains);
    }

    /// Toggle the nullspace sub-flag.  Ignored while stiffness is `Zero`.
    pub fn set_nullspace(&self, on: bool) {
        let gains = {
            let mut st = self.locked();
            st.stiffness.set_nullspace(on)
        };
        match gains {
            Some(gains) => {
                info!(nullspace = on, "nullspace stiffness toggled");
                self.push_gains(&gains);
            }
            None => debug!("nullspace toggle ignored while stiffness is off"),
        }
    }

    fn push_gains(&self, gains: &teleos_types::StiffnessGains) {
        if let Err(e) = self.gateway.set_stiffness(gains) {
            warn!(error = %e, "failed to push stiffness gains");
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Reads
    // ────────────────────────────────────────────────────────────────────

    /// A consistent copy of the goal pose, or `None` before initialisation.
    /// Holds the lock only for the copy.
    pub fn snapshot(&self) -> Option<Pose> {
        self.locked().goal
    }

    /// The latest measured pose, or `None` before the first feedback sample.
    pub fn current(&self) -> Option<Pose> {
        self.locked().current
    }

    /// Current stiffness state (for status displays and tests).
    pub fn stiffness_state(&self) -> StiffnessState {
        self.locked().stiffness.state()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
