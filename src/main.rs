use buildsense::cli::commands::{CliArgs, Commands};
use buildsense::cli::handlers::{handle_build, handle_cache, handle_classify, handle_resolve};
use buildsense::util::logging::{config_from_env, init_logging, parse_level, LoggingConfig};
use buildsense::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(logging_config(&args));

    debug!("buildsense v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let format = args.format.into();
    let exit_code = match &args.command {
        Commands::Classify(classify_args) => handle_classify(classify_args, format).await,
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args, format).await,
        Commands::Build(build_args) => handle_build(build_args, format).await,
        Commands::Cache(cache_args) => handle_cache(cache_args, format).await,
    };

    std::process::exit(exit_code);
}

/// Flags win over `BUILDSENSE_LOG_LEVEL`
fn logging_config(args: &CliArgs) -> LoggingConfig {
    let mut config = config_from_env();
    if let Some(level) = &args.log_level {
        config.level = parse_level(level);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    config
}
