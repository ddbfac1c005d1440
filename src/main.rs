use mdmdoc::cli::commands::{CliArgs, Commands, GenerateArgs, InspectArgs};
use mdmdoc::cli::output::{OutputFormat, OutputFormatter};
use mdmdoc::report::DEFAULT_TITLE;
use mdmdoc::util::logging::{self, parse_level};
use mdmdoc::{ArtifactAggregator, FileSystem, MdmdocConfig, RealFileSystem, VERSION};

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("mdmdoc v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let config = match load_config() {
        Some(config) => config,
        None => process::exit(1),
    };

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args, config, args.quiet),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args, config),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        Some(parse_level(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    };

    match level {
        Some(level) => logging::init_logging(logging::config_from_env(Some(level))),
        None => logging::init_from_env(),
    }
}

fn load_config() -> Option<MdmdocConfig> {
    let config = match MdmdocConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return None;
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your MDMDOC_* environment variables.");
        return None;
    }

    debug!("{}", config);
    Some(config)
}

fn handle_generate(args: &GenerateArgs, config: MdmdocConfig, quiet: bool) -> i32 {
    let repo_path = match &args.repository_path {
        Some(path) => path.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return 1;
            }
        },
    };

    if !repo_path.is_dir() {
        error!(
            "Repository path is not a directory: {}",
            repo_path.display()
        );
        return 1;
    }

    let repo_path: PathBuf = match repo_path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize repository path: {}", e);
            return 1;
        }
    };

    info!("Documenting repository: {}", repo_path.display());

    let aggregator = ArtifactAggregator::new(Arc::new(RealFileSystem), repo_path, config);
    let artifacts = match aggregator.run() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("Aggregation failed: {:#}", e);
            return 1;
        }
    };

    let title = args.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let today = chrono::Local::now().date_naive();
    let formatter = OutputFormatter::new(args.format.into());

    let output = match formatter.format_report(&artifacts, title, today) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            return 1;
        }
    };

    write_output(&output, args.output.as_ref(), quiet)
}

fn handle_inspect(args: &InspectArgs, config: MdmdocConfig) -> i32 {
    let fs = RealFileSystem;
    if !fs.is_file(&args.file) {
        error!("Not a file: {}", args.file.display());
        return 1;
    }

    let root = args
        .file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let aggregator = ArtifactAggregator::new(Arc::new(fs), root, config);

    let extraction = match aggregator.inspect(&args.file) {
        Ok(extraction) => extraction,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let format: OutputFormat = args.format.into();
    match OutputFormatter::new(format).format_inspection(&args.file, &extraction) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}

fn write_output(output: &str, path: Option<&PathBuf>, quiet: bool) -> i32 {
    match path {
        Some(output_file) => match std::fs::write(output_file, output) {
            Ok(_) => {
                info!("Output written to: {}", output_file.display());
                if !quiet {
                    println!("Output written to: {}", output_file.display());
                }
                0
            }
            Err(e) => {
                error!("Failed to write output to file: {}", e);
                1
            }
        },
        None => {
            print!("{}", output);
            0
        }
    }
}
