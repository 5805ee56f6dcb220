//! Networking layer shared by the server and the bots.
//!
//! The transport itself (WebSockets) lives in the server crate. This module
//! only defines the JSON protocol and the per-connection outbound handle.

/// Per-connection outbound event handle.
pub mod connection;

/// Message types for the client-server JSON protocol.
pub mod messages;
