//! End-to-end scenarios for the ORGV workspace.

mod harness;
mod scenarios;
