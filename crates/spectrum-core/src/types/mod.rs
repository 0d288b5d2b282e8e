//! Core data types: channels, samples, status snapshot, connection state.

pub mod channel;
pub mod status;

pub use channel::*;
pub use status::*;
