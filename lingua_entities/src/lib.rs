//! Database entities.

pub mod conversation_history;
