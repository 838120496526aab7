//! Integration tests for provcheck CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them open an SSH session.

mod check_command;
mod config_command;
