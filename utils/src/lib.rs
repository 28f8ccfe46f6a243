//! Shared utilities for lexcheck.

pub mod atomic_write;

pub use atomic_write::atomic_write;
