//! Unit tests for disputecast modules
//!
//! These tests drive the public API on the virtual clock; nothing here
//! touches a terminal.

mod test_config;
mod test_runtime;
mod test_script;
mod test_sequencer;
mod test_stage;
