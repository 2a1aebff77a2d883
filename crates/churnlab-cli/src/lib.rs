//! churnlab-cli: command-line surface of the churn workbench.
pub mod workbench;
