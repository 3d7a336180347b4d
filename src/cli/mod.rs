pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CacheAction, CacheArgs, ClassifyArgs, CliArgs, Commands, ResolveArgs};
pub use output::{OutputFormat, OutputFormatter};
