//! Cybersecurity news poster library.
//!
//! Polls news search APIs for cybersecurity articles and posts unseen ones
//! to X as single tweets or reply threads on a fixed schedule.

pub mod composer;
pub mod config;
pub mod dedup;
pub mod error;
pub mod news;
pub mod pipeline;
pub mod publisher;
pub mod scheduler;
pub mod selector;
