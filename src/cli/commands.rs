use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Classifies JavaScript/TypeScript projects and resolves their build configuration
#[derive(Parser, Debug)]
#[command(
    name = "buildsense",
    about = "Classify a project, resolve its build configuration, and run cached builds",
    version,
    long_about = "buildsense inspects a project's manifest, dependencies, config files and \
                  sources to decide what kind of library it is, turns that into a concrete \
                  build configuration, and hands it to an external build engine with a \
                  content-addressed result cache in front."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,

    #[arg(
        short = 'f',
        long,
        global = true,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Classify a project",
        long_about = "Scores the project against every known category and reports the winner, \
                      its confidence and the alternatives.\n\n\
                      Examples:\n  \
                      buildsense classify\n  \
                      buildsense classify ./packages/ui --format json\n  \
                      buildsense classify --taxonomy project"
    )]
    Classify(ClassifyArgs),

    #[command(
        about = "Resolve the build configuration without building",
        long_about = "Runs classification, strategy resolution and config merging and prints \
                      the configuration the engine would receive.\n\n\
                      Examples:\n  \
                      buildsense resolve\n  \
                      buildsense resolve --config buildsense.yaml --mode development"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "Build a project with an external engine",
        long_about = "Resolves the configuration and runs the engine program with it on stdin, \
                      reusing a cached result when manifest, configuration and engine are unchanged.\n\n\
                      Examples:\n  \
                      buildsense build --engine node --engine-arg scripts/build.mjs\n  \
                      buildsense build ./lib --engine ./bundle.sh --no-cache"
    )]
    Build(BuildArgs),

    #[command(about = "Inspect or clear the build cache")]
    Cache(CacheArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(value_name = "PATH", help = "Project path (defaults to current directory)")]
    pub path: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "library", help = "Category table to score against")]
    pub taxonomy: TaxonomyArg,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(value_name = "PATH", help = "Project path (defaults to current directory)")]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "User overrides (.json, .toml, .yaml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "MODE", help = "Build mode (development|production)")]
    pub mode: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    #[arg(long, value_name = "PROGRAM", help = "Engine program to run")]
    pub engine: String,

    #[arg(
        long = "engine-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        help = "Argument passed to the engine (repeatable)"
    )]
    pub engine_args: Vec<String>,

    #[arg(long, help = "Skip the build cache")]
    pub no_cache: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    #[command(about = "Show entry count and size")]
    Stats,
    #[command(about = "Remove every cached record")]
    Clear,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyArg {
    Library,
    Project,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
