//! [`TeleopNode`] – wires the fusion core to the event bus.
//!
//! Three long-lived Tokio tasks:
//!
//! 1. **Device dispatch** – consumes [`Topic::DeviceInput`] and routes each
//!    [`DeviceEvent`] variant to its adapter.  Adapters are cheap and
//!    synchronous, so dispatch never blocks the bus for long.
//! 2. **Feedback** – consumes [`Topic::PoseFeedback`] and feeds every sample
//!    into the engine, which also performs the continuous zero-stiffness
//!    goal tracking.
//! 3. **Goal publication** – a fixed-rate tick (default 100 Hz) that
//!    snapshots the goal and emits it on [`Topic::GoalPose`] whether or not
//!    it changed since the last tick.  Stays silent until the goal has been
//!    initialised by the first feedback-driven reset.
//!
//! There is no cancellation or timeout on any device path; events are
//! fire-and-forget, and an unresponsive device simply stops contributing
//! deltas.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use teleos_fusion::adapters::{
    GamepadAdapter, GamepadSettings, KeyAdapter, KeySettings, PointerAdapter, PointerSettings,
    SpatialInputAdapter, SpatialSettings,
};
use teleos_fusion::engine::PoseFusionEngine;
use teleos_fusion::modes::InputModes;
use teleos_middleware::{EventBus, Topic, TopicReceiver};
use teleos_types::{DeviceEvent, Event, EventPayload};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`TeleopNode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleopNodeConfig {
    /// Goal publication cadence (ticks per second).
    pub publish_rate_hz: u32,
    pub key: KeySettings,
    pub pointer: PointerSettings,
    pub spatial: SpatialSettings,
    pub gamepad: GamepadSettings,
}

impl Default for TeleopNodeConfig {
    fn default() -> Self {
        Self {
            publish_rate_hz: 100,
            key: KeySettings::default(),
            pointer: PointerSettings::default(),
            spatial: SpatialSettings::default(),
            gamepad: GamepadSettings::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TeleopNode
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the adapters and the bus subscriptions that drive the fusion core.
pub struct TeleopNode {
    bus: EventBus,
    engine: Arc<PoseFusionEngine>,
    key: Arc<KeyAdapter>,
    pointer: Arc<PointerAdapter>,
    spatial: Arc<SpatialInputAdapter>,
    gamepad: Arc<GamepadAdapter>,
    publish_rate_hz: u32,
}

impl TeleopNode {
    /// Build the four adapters around a shared engine, mode flags, and the
    /// global key-suspend flag.
    pub fn new(
        bus: EventBus,
        engine: Arc<PoseFusionEngine>,
        modes: Arc<InputModes>,
        suspend: Arc<AtomicBool>,
        config: TeleopNodeConfig,
    ) -> Self {
        let key = Arc::new(KeyAdapter::new(
            engine.clone(),
            modes.clone(),
            suspend,
            config.key,
        ));
        let pointer = Arc::new(PointerAdapter::new(
            engine.clone(),
            modes.clone(),
            config.pointer,
        ));
        let spatial = Arc::new(SpatialInputAdapter::new(
            engine.clone(),
            modes.clone(),
            config.spatial,
        ));
        let gamepad = Arc::new(GamepadAdapter::new(engine.clone(), modes, config.gamepad));
        Self {
            bus,
            engine,
            key,
            pointer,
            spatial,
            gamepad,
            publish_rate_hz: config.publish_rate_hz.max(1),
        }
    }

    /// Start the device-dispatch, feedback, and publication tasks.
    ///
    /// Must be called within a Tokio runtime.  The tasks run until the
    /// process exits (or the returned handles are aborted).
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let device_rx = self.bus.subscribe_to(Topic::DeviceInput);
        let feedback_rx = self.bus.subscribe_to(Topic::PoseFeedback);

        info!(rate_hz = self.publish_rate_hz, "teleop node starting");

        vec![
            tokio::spawn(run_device_loop(
                device_rx,
                self.key,
                self.pointer,
                self.spatial,
                self.gamepad,
            )),
            tokio::spawn(run_feedback_loop(feedback_rx, self.engine.clone())),
            tokio::spawn(run_publish_loop(
                self.bus,
                self.engine,
                self.publish_rate_hz,
            )),
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task bodies
// ─────────────────────────────────────────────────────────────────────────────

async fn run_device_loop(
    mut rx: TopicReceiver,
    key: Arc<KeyAdapter>,
    pointer: Arc<PointerAdapter>,
    spatial: Arc<SpatialInputAdapter>,
    gamepad: Arc<GamepadAdapter>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => dispatch_device_event(event, &key, &pointer, &spatial, &gamepad),
            Err(RecvError::Lagged(n)) => {
                warn!(lagged_by = n, "device subscriber lagged; events dropped");
            }
            Err(RecvError::Closed) => {
                debug!("device input channel closed; dispatch task exiting");
                break;
            }
        }
    }
}

fn dispatch_device_event(
    event: Event,
    key: &KeyAdapter,
    pointer: &PointerAdapter,
    spatial: &SpatialInputAdapter,
    gamepad: &GamepadAdapter,
) {
    let EventPayload::Device(device) = event.payload else {
        debug!(source = %event.source, "non-device payload on DeviceInput; ignoring");
        return;
    };
    match device {
        DeviceEvent::KeyPress(c) => key.handle(c),
        DeviceEvent::PointerMove { x, y } => pointer.handle_move(x, y),
        DeviceEvent::PointerScroll { dx, dy } => pointer.handle_scroll(dx, dy),
        DeviceEvent::SpatialTwist { linear, angular } => spatial.handle(linear, angular),
        DeviceEvent::GamepadFrame { axes } => {
            if let Err(e) = gamepad.handle(&axes) {
                warn!(source = %event.source, error = %e, "rejected gamepad frame");
            }
        }
    }
}

async fn run_feedback_loop(mut rx: TopicReceiver, engine: Arc<PoseFusionEngine>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.payload {
                EventPayload::Feedback(pose) => engine.feedback(pose),
                other => {
                    debug!(source = %event.source, payload = ?other, "non-feedback payload on PoseFeedback; ignoring");
                }
            },
            Err(RecvError::Lagged(n)) => {
                // Only the freshest sample matters; dropped ones are stale.
                debug!(lagged_by = n, "feedback subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn run_publish_loop(bus: EventBus, engine: Arc<PoseFusionEngine>, rate_hz: u32) {
    let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let Some(pose) = engine.snapshot() else {
            // Goal not initialised yet; publishing an undefined pose would
            // command the arm to the origin.
            continue;
        };
        let event = Event::new("teleos-runtime::publisher", EventPayload::Goal(pose));
        if bus.publish_to(Topic::GoalPose, event).is_err() {
            debug!("no goal subscriber this tick");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::BusStiffnessGateway;
    use std::time::Instant;
    use teleos_fusion::stiffness::{StiffnessLimits, StiffnessState};
    use teleos_types::{Pose, Quaternion, Vec3};
    use tokio::time::{sleep, timeout};

    struct Fixture {
        bus: EventBus,
        engine: Arc<PoseFusionEngine>,
        handles: Vec<JoinHandle<()>>,
    }

    impl Fixture {
        fn start(config: TeleopNodeConfig) -> Self {
            let bus = EventBus::default();
            let engine = Arc::new(PoseFusionEngine::new(
                StiffnessLimits::default(),
                Arc::new(BusStiffnessGateway::new(bus.clone())),
            ));
            let node = TeleopNode::new(
                bus.clone(),
                engine.clone(),
                Arc::new(InputModes::new()),
                Arc::new(AtomicBool::new(false)),
                config,
            );
            let handles = node.spawn();
            Self {
                bus,
                engine,
                handles,
            }
        }

        fn publish_device(&self, device: DeviceEvent) {
            self.bus
                .publish_to(Topic::DeviceInput, Event::new("test", EventPayload::Device(device)))
                .expect("device task subscribed");
        }

        fn publish_feedback(&self, pose: Pose) {
            self.bus
                .publish_to(
                    Topic::PoseFeedback,
                    Event::new("test", EventPayload::Feedback(pose)),
                )
                .expect("feedback task subscribed");
        }

        /// Publish a feedback sample and wait until the feedback task has
        /// ingested it, so later device events observe it as "current".
        async fn feed_and_settle(&self, pose: Pose) {
            self.publish_feedback(pose);
            self.wait_until("feedback ingested", |engine| engine.current() == Some(pose))
                .await;
        }

        async fn wait_until(&self, what: &str, predicate: impl Fn(&Arc<PoseFusionEngine>) -> bool) {
            let deadline = Instant::now() + Duration::from_secs(2);
            while Instant::now() < deadline {
                if predicate(&self.engine) {
                    return;
                }
                sleep(Duration::from_millis(5)).await;
            }
            panic!("timed out waiting for: {what}");
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            for handle in &self.handles {
                handle.abort();
            }
        }
    }

    #[tokio::test]
    async fn feedback_samples_reach_the_engine() {
        let fixture = Fixture::start(TeleopNodeConfig::default());
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quaternion::identity());

        // Engine starts Full, so the goal only picks up feedback after '9'.
        fixture.feed_and_settle(pose).await;
        fixture.publish_device(DeviceEvent::KeyPress('9'));

        fixture
            .wait_until("goal reset to feedback pose", |engine| {
                engine.snapshot() == Some(pose)
            })
            .await;
        assert_eq!(
            fixture.engine.stiffness_state(),
            StiffnessState::Full { nullspace: false }
        );
    }

    #[tokio::test]
    async fn key_events_jog_the_goal_once_keyboard_enabled() {
        let fixture = Fixture::start(TeleopNodeConfig::default());
        fixture.feed_and_settle(Pose::identity()).await;
        fixture.publish_device(DeviceEvent::KeyPress('9'));
        fixture.publish_device(DeviceEvent::KeyPress('1'));
        for _ in 0..3 {
            fixture.publish_device(DeviceEvent::KeyPress('w'));
        }

        fixture
            .wait_until("three forward steps applied", |engine| {
                engine
                    .snapshot()
                    .is_some_and(|goal| (goal.position.x - 0.03).abs() < 1e-12)
            })
            .await;
    }

    #[tokio::test]
    async fn goal_is_republished_on_the_tick_without_changes() {
        let fixture = Fixture::start(TeleopNodeConfig {
            publish_rate_hz: 200,
            ..TeleopNodeConfig::default()
        });
        let mut goal_rx = fixture.bus.subscribe_to(Topic::GoalPose);

        let pose = Pose::new(Vec3::new(0.5, 0.0, 0.0), Quaternion::identity());
        fixture.feed_and_settle(pose).await;
        fixture.publish_device(DeviceEvent::KeyPress('9'));

        // Two consecutive ticks must both carry the (unchanged) goal.
        for _ in 0..2 {
            let event = timeout(Duration::from_secs(2), goal_rx.recv())
                .await
                .expect("tick within deadline")
                .expect("goal event");
            match event.payload {
                EventPayload::Goal(goal) => assert_eq!(goal, pose),
                other => panic!("unexpected payload: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn publisher_stays_silent_before_goal_initialisation() {
        let fixture = Fixture::start(TeleopNodeConfig {
            publish_rate_hz: 200,
            ..TeleopNodeConfig::default()
        });
        let mut goal_rx = fixture.bus.subscribe_to(Topic::GoalPose);

        let result = timeout(Duration::from_millis(100), goal_rx.recv()).await;
        assert!(result.is_err(), "no goal may be published before the first reset");
    }

    #[tokio::test]
    async fn zero_stiffness_tracks_feedback_through_the_bus() {
        let fixture = Fixture::start(TeleopNodeConfig::default());
        fixture.feed_and_settle(Pose::identity()).await;
        fixture.publish_device(DeviceEvent::KeyPress('9'));
        fixture
            .wait_until("goal initialised", |engine| engine.snapshot().is_some())
            .await;

        fixture.publish_device(DeviceEvent::KeyPress('0'));
        fixture
            .wait_until("stiffness off", |engine| {
                engine.stiffness_state() == StiffnessState::Zero
            })
            .await;

        let sample = Pose::new(
            Vec3::new(0.4, -0.2, 0.9),
            Quaternion::from_rotation_vector(Vec3::new(0.0, 0.0, 0.3)),
        );
        fixture.publish_feedback(sample);
        fixture
            .wait_until("goal tracks feedback exactly", |engine| {
                engine.snapshot() == Some(sample)
            })
            .await;
    }

    #[tokio::test]
    async fn malformed_gamepad_frame_leaves_goal_unchanged() {
        let fixture = Fixture::start(TeleopNodeConfig::default());
        fixture.feed_and_settle(Pose::identity()).await;
        fixture.publish_device(DeviceEvent::KeyPress('9'));
        fixture.publish_device(DeviceEvent::KeyPress('4'));
        fixture
            .wait_until("goal initialised", |engine| engine.snapshot().is_some())
            .await;

        fixture.publish_device(DeviceEvent::GamepadFrame {
            axes: vec![0.9, 0.9],
        });
        // A well-formed follow-up frame proves the task survived the error.
        fixture.publish_device(DeviceEvent::GamepadFrame {
            axes: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        });
        fixture
            .wait_until("well-formed frame applied", |engine| {
                engine
                    .snapshot()
                    .is_some_and(|goal| (goal.position.z - 0.002).abs() < 1e-12)
            })
            .await;
    }
}
