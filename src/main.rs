use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod build;
mod commands;
mod config;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: LandfallCommand,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,

    /// Only print what would be deleted
    #[arg(short = 'n', long, default_value = "false")]
    dry_run: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config_file: Option<PathBuf>,

    /// Whether to watch for changes and rebuild automatically
    #[arg(short, long, default_value = "true", action = clap::ArgAction::Set)]
    watch: bool,
}

#[derive(Subcommand)]
enum LandfallCommand {
    /// Generate the site into the output directory
    Build(BuildArgs),

    /// Validate content without writing any output
    Check(CheckArgs),

    /// Delete the output directory
    Clean(CleanArgs),

    /// Build, serve and rebuild the site on changes
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    match args.command {
        LandfallCommand::Build(args) => {
            commands::build::run(&args)?;
        }
        LandfallCommand::Check(args) => {
            commands::check::run(&args)?;
        }
        LandfallCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
        LandfallCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
    }

    Ok(())
}
