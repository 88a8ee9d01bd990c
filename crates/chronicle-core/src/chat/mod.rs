//! Newsroom chat domain.

mod message;

pub use message::{ChatRole, ChatTurn};
