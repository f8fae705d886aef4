pub mod commands;
pub mod context;
pub mod formatters;
pub mod output;
pub mod registry;
pub mod shell;
pub mod style;
pub mod table;

pub use context::{CliMode, CommandError, CommandResult, LoopControl, ShellContext};
pub use shell::run_cli;
