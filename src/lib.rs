//! plclog - daily PLC vibration logs to S3, partitions to Athena
//!
//! The `plclog` binary wires these commands to the workspace crates:
//! key derivation in `plclog-core`, uploads in `plclog-storage` and
//! partition registration in `plclog-catalog`.

pub mod commands;
