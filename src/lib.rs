//! Viva Core Library
//!
//! This crate provides the call-session core for the Viva voice interview
//! assistant: provider event routing, the call lifecycle state machine,
//! trigger-phrase detection, slot extraction and downstream dispatch.

pub mod dispatch;
pub mod extract;
pub mod intent;
pub mod provider;
pub mod session;
pub mod telemetry;
