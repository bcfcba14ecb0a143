#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! HTTP API for the translate agent.
//!
//! Routes live under `/api`. The conversation is chosen by the
//! `x-thread-id` request header; a translate request without one starts a
//! new conversation.

pub mod contract;
mod error;
mod handlers;
mod server;
mod state;

pub use error::ApiError;
pub use server::{router, start_http_server};
pub use state::ApiState;

/// Header naming the conversation a request belongs to.
pub const THREAD_ID_HEADER: &str = "x-thread-id";
