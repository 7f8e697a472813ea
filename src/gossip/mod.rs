//! Randomized rumor-spreading gossip subsystem.

pub mod holder;
pub mod message;
pub mod network_config;
pub mod rumor_state;

pub use holder::RumorHolder;
pub use message::{Message, MessageType, NO_RUMOR};
pub use network_config::NetworkConfig;
pub use rumor_state::{RumorPhase, RumorStateMachine};
