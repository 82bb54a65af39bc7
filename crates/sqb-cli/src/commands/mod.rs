//! Command handlers for the `sqb` binary.

pub mod check_updates;
pub mod init_metadata;
pub mod run;
pub mod status;
