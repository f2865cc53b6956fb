//! Pure logic for the coolredis plugin.
//!
//! Nothing in this crate performs I/O: configuration resolution, the
//! connection state machine, status values and the cache traits live here,
//! while `coolredis` wires them to Redis and to the host.

pub mod cache;
pub mod config;
pub mod connection;
pub mod status;
