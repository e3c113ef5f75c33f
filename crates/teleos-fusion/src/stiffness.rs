//! Stiffness state machine and the gateway seam to the compliance controller.
//!
//! The impedance controller pulls the arm toward the equilibrium pose with
//! spring-like force proportional to seven gains: three translational, three
//! rotational, one nullspace.  [`StiffnessProfile`] tracks which of two
//! states the controller is in:
//!
//! * `Full { nullspace }` – task-space gains at their configured maxima,
//!   nullspace gain at its configured on-value or 0.
//! * `Zero` – all seven gains at 0.  While here, the goal pose must track the
//!   measured pose every feedback sample so re-enabling never snaps the arm.
//!
//! Every transition yields the full seven-gain vector; the caller pushes it
//! through the [`StiffnessGateway`] port.

use serde::{Deserialize, Serialize};
use teleos_types::{StiffnessGains, TeleopError};

/// Single narrow interface to the external compliance-parameter service.
///
/// Implementations translate the seven-gain vector into whatever transport
/// reaches the controller (the runtime ships a bus-backed one).  Writes are
/// fire-and-forget; a failed push is reported, never fatal.
pub trait StiffnessGateway: Send + Sync {
    fn set_stiffness(&self, gains: &StiffnessGains) -> Result<(), TeleopError>;
}

/// Configured gain maxima applied when stiffness is engaged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StiffnessLimits {
    /// Translational gain per axis when engaged.
    pub translational: f64,
    /// Rotational gain per axis when engaged.
    pub rotational: f64,
    /// Nullspace gain while the nullspace sub-flag is on.
    pub nullspace_on: f64,
}

impl Default for StiffnessLimits {
    fn default() -> Self {
        Self {
            translational: 600.0,
            rotational: 30.0,
            nullspace_on: 1.0,
        }
    }
}

/// The two top-level stiffness states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StiffnessState {
    /// Task-space gains at their maxima; `nullspace` is the orthogonal
    /// sub-flag for redundant-joint resistance.
    Full { nullspace: bool },
    /// All seven gains at zero.
    Zero,
}

/// State machine over [`StiffnessState`] plus the configured limits.
///
/// Transition methods return the seven-gain vector to push; a `None` return
/// means the request was invalid in the current state and nothing changed.
#[derive(Debug, Clone)]
pub struct StiffnessProfile {
    state: StiffnessState,
    limits: StiffnessLimits,
}

impl StiffnessProfile {
    /// Start in `Full { nullspace: false }`: the controller is assumed stiff
    /// until the operator disengages it.
    pub fn new(limits: StiffnessLimits) -> Self {
        Self {
            state: StiffnessState::Full { nullspace: false },
            limits,
        }
    }

    pub fn state(&self) -> StiffnessState {
        self.state
    }

    pub fn is_zero(&self) -> bool {
        self.state == StiffnessState::Zero
    }

    /// The gain vector corresponding to the current state.
    pub fn gains(&self) -> StiffnessGains {
        match self.state {
            StiffnessState::Zero => StiffnessGains::zero(),
            StiffnessState::Full { nullspace } => StiffnessGains::uniform(
                self.limits.translational,
                self.limits.rotational,
                if nullspace { self.limits.nullspace_on } else { 0.0 },
            ),
        }
    }

    /// `Zero → Full { nullspace: false }` (also re-entered from `Full`,
    /// clearing the nullspace sub-flag).  Returns the gains to push.
    pub fn engage(&mut self) -> StiffnessGains {
        self.state = StiffnessState::Full { nullspace: false };
        self.gains()
    }

    /// `Full → Zero`.  Returns the all-zero gain vector to push.
    pub fn disengage(&mut self) -> StiffnessGains {
        self.state = StiffnessState::Zero;
        self.gains()
    }

    /// Flip the nullspace sub-flag.  Valid only within `Full`; returns
    /// `None` (no push, no change) while in `Zero`.
    pub fn set_nullspace(&mut self, on: bool) -> Option<StiffnessGains> {
        match self.state {
            StiffnessState::Full { .. } => {
                self.state = StiffnessState::Full { nullspace: on };
                Some(self.gains())
            }
            StiffnessState::Zero => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full_without_nullspace() {
        let profile = StiffnessProfile::new(StiffnessLimits::default());
        assert_eq!(profile.state(), StiffnessState::Full { nullspace: false });
        assert!(!profile.is_zero());
    }

    #[test]
    fn engage_produces_full_gains_with_zero_nullspace() {
        let mut profile = StiffnessProfile::new(StiffnessLimits::default());
        let gains = profile.engage();
        assert_eq!(gains.translational_x, 600.0);
        assert_eq!(gains.translational_z, 600.0);
        assert_eq!(gains.rotational_y, 30.0);
        assert_eq!(gains.nullspace, 0.0);
    }

    #[test]
    fn disengage_zeroes_all_seven_gains() {
        let mut profile = StiffnessProfile::new(StiffnessLimits::default());
        let gains = profile.disengage();
        assert_eq!(gains, StiffnessGains::zero());
        assert!(profile.is_zero());
    }

    #[test]
    fn nullspace_toggle_within_full() {
        let mut profile = StiffnessProfile::new(StiffnessLimits::default());
        let gains = profile.set_nullspace(true).expect("valid in Full");
        assert_eq!(gains.nullspace, 1.0);
        assert_eq!(gains.translational_x, 600.0);
        assert_eq!(profile.state(), StiffnessState::Full { nullspace: true });

        let gains = profile.set_nullspace(false).expect("valid in Full");
        assert_eq!(gains.nullspace, 0.0);
    }

    #[test]
    fn nullspace_toggle_rejected_in_zero() {
        let mut profile = StiffnessProfile::new(StiffnessLimits::default());
        profile.disengage();
        assert!(profile.set_nullspace(true).is_none());
        assert!(profile.is_zero());
    }

    #[test]
    fn engage_clears_nullspace_flag() {
        let mut profile = StiffnessProfile::new(StiffnessLimits::default());
        profile.set_nullspace(true);
        profile.engage();
        assert_eq!(profile.state(), StiffnessState::Full { nullspace: false });
    }

    #[test]
    fn custom_limits_flow_into_gains() {
        let mut profile = StiffnessProfile::new(StiffnessLimits {
            translational: 200.0,
            rotational: 15.0,
            nullspace_on: 5.0,
        });
        let gains = profile.set_nullspace(true).expect("valid in Full");
        assert_eq!(gains.translational_y, 200.0);
        assert_eq!(gains.rotational_z, 15.0);
        assert_eq!(gains.nullspace, 5.0);
    }
}
