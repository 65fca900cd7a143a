//! Command implementations, one module per subcommand

pub mod check;
pub mod report;
pub mod run;
pub mod schemas;
