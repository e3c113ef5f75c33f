//! Bus-backed implementation of the stiffness gateway port.
//!
//! The fusion core never talks to the compliance-parameter service directly;
//! it pushes the seven-gain vector through the
//! [`StiffnessGateway`][teleos_fusion::stiffness::StiffnessGateway] trait.
//! This implementation envelopes each write as an
//! [`EventPayload::Stiffness`] on [`Topic::StiffnessCommands`], where the
//! external service (or a transport bridge for it) subscribes.

use teleos_fusion::stiffness::StiffnessGateway;
use teleos_middleware::{EventBus, Topic};
use teleos_types::{Event, EventPayload, StiffnessGains, TeleopError};
use tracing::debug;

/// Publishes gain writes onto the event bus.
///
/// The boundary is fire-and-forget: publishing with no subscriber is normal
/// during startup and tests, so it is logged and swallowed rather than
/// surfaced to the fusion core.
pub struct BusStiffnessGateway {
    bus: EventBus,
}

impl BusStiffnessGateway {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl StiffnessGateway for BusStiffnessGateway {
    fn set_stiffness(&self, gains: &StiffnessGains) -> Result<(), TeleopError> {
        let event = Event::new(
            "teleos-runtime::stiffness",
            EventPayload::Stiffness(*gains),
        );
        match self.bus.publish_to(Topic::StiffnessCommands, event) {
            Ok(_) => Ok(()),
            Err(TeleopError::Channel(_)) => {
                debug!("no compliance-parameter subscriber; stiffness write dropped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
