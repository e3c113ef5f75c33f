//! Typed, topic-based publish/subscribe event bus.
//!
//! Built on [`tokio::sync::broadcast`] channels so every subscriber receives
//! every message without any single subscriber blocking the others.
//!
//! # Topics
//!
//! Traffic is partitioned into four [`Topic`] lanes so components only
//! receive the messages they care about:
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::DeviceInput`] | Raw key / pointer / spatial / gamepad samples |
//! | [`Topic::PoseFeedback`] | The arm's measured end-effector pose |
//! | [`Topic::GoalPose`] | The fused equilibrium pose, on the 100 Hz tick |
//! | [`Topic::StiffnessCommands`] | Seven-gain writes for the compliance service |

use teleos_types::{Event, TeleopError};
use tokio::sync::broadcast;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all first-class routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Raw device samples heading for the adapters.
    DeviceInput,
    /// Measured pose samples from the arm's pose sensor.
    PoseFeedback,
    /// The fused equilibrium pose emitted on the fixed publish tick.
    GoalPose,
    /// Gain writes heading for the compliance-parameter service.
    StiffnessCommands,
}

/// Shared event bus.  Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    device_input: broadcast::Sender<Event>,
    pose_feedback: broadcast::Sender<Event>,
    goal_pose: broadcast::Sender<Event>,
    stiffness_commands: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity, applied to every
    /// topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (device_input, _) = broadcast::channel(capacity);
        let (pose_feedback, _) = broadcast::channel(capacity);
        let (goal_pose, _) = broadcast::channel(capacity);
        let (stiffness_commands, _) = broadcast::channel(capacity);
        Self {
            device_input,
            pose_feedback,
            goal_pose,
            stiffness_commands,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`TeleopError::Channel`] when no subscriber is currently listening on
    /// the topic.  For fire-and-forget boundaries (goal publication,
    /// stiffness writes) the caller is expected to tolerate that error.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, TeleopError> {
        self.topic_sender(topic)
            .send(event)
            .map_err(|broadcast::error::SendError(_)| {
                TeleopError::Channel(format!("no subscribers for topic {topic:?}"))
            })
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The returned [`TopicReceiver`] yields only events published to that
    /// topic.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::DeviceInput => &self.device_input,
            Topic::PoseFeedback => &self.pose_feedback,
            Topic::GoalPose => &self.goal_pose,
            Topic::StiffnessCommands => &self.stiffness_commands,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.  The caller decides whether to
    ///   continue or abort.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}
