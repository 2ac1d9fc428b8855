//! Helpers shared by the bridge

pub mod scheduler;
