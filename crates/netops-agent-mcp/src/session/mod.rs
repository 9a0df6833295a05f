//! Session-scoped services for tool handlers.

pub mod manager;

pub use manager::NetOpsSessionManager;
