//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: SSH sessions, TCP probes,
//! timers, key and config files, and embedded assets.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod assets;
pub mod clock;
pub mod config;
pub mod keys;
pub mod network;
pub mod ssh;
