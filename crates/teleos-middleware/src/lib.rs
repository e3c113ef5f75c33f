//! `teleos-middleware` – the nervous system.
//!
//! Routes asynchronous data between input devices, the fusion core, and the
//! external controller boundaries without caring about the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – typed, topic-based publish/subscribe event bus built on
//!   Tokio broadcast channels.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};
