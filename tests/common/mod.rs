//! Common test utilities.
//!
//! Shared fixtures for driving real `/bin/sh` subprocesses through the
//! supervisor.

pub mod fixtures;
