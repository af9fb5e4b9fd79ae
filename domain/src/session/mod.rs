//! Model conversation domain.
//!
//! - [`message::ChatMessage`]: one entry of the message history sent to a model

pub mod message;
