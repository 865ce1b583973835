//! E2E test harness for ORGV.

pub mod workspace;

pub use workspace::Workspace;
