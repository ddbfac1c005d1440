use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Configuration artifact documentation generator
#[derive(Parser, Debug)]
#[command(
    name = "mdmdoc",
    about = "Documents device-management configuration artifacts",
    version,
    author,
    long_about = "mdmdoc walks a configuration repository, extracts the settings from \
                  settings-catalog JSON, compliance policies, enrollment restrictions, \
                  configuration profiles and sidecar manifests, and renders them as a \
                  single report."
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
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate documentation for every artifact in a repository",
        long_about = "Discovers JSON documents, .mobileconfig profiles and XML manifests \
                      below PATH and renders one report covering all of them.\n\n\
                      Examples:\n  \
                      mdmdoc generate\n  \
                      mdmdoc generate /path/to/repo -o docs/Configuration.md\n  \
                      mdmdoc generate --format json"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Show the detected shape and settings of one document",
        long_about = "Runs shape detection and extraction on a single file.\n\n\
                      Examples:\n  \
                      mdmdoc inspect configurations/intune/pol-sec-001.json\n  \
                      mdmdoc inspect cfg-dck-001.mobileconfig --format yaml"
    )]
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "markdown",
        help = "Output format"
    )]
    pub format: ReportFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "TEXT", help = "Report title")]
    pub title: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    #[arg(value_name = "FILE", help = "Document to inspect")]
    pub file: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: InspectFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormatArg {
    Markdown,
    Json,
    Yaml,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<ReportFormatArg> for super::output::OutputFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Markdown => super::output::OutputFormat::Markdown,
            ReportFormatArg::Json => super::output::OutputFormat::Json,
            ReportFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}

impl From<InspectFormatArg> for super::output::OutputFormat {
    fn from(arg: InspectFormatArg) -> Self {
        match arg {
            InspectFormatArg::Json => super::output::OutputFormat::Json,
            InspectFormatArg::Yaml => super::output::OutputFormat::Yaml,
            InspectFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
