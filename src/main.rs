mod cleanup;
mod commands;
mod config;
mod context;
mod logging;
mod output;
mod traits;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{CleanCommand, CleanOptions, RulesCommand};
use config::CleanupConfig;
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tfclean")]
#[command(about = "Strip redundant attributes from Terraform generated configuration", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to .tfclean.yaml in the current directory)
    #[arg(short, long, global = true, env = "TFCLEAN_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean generated configuration files in place
    Clean {
        /// Files produced by `terraform plan -generate-config-out`
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the cleaned copy here instead of rewriting the input
        #[arg(short, long, conflicts_with = "dry_run")]
        output: Option<PathBuf>,

        /// Close resource blocks at a top-level `}` line
        #[arg(long)]
        strict_blocks: bool,

        /// Run the formatter on each cleaned file
        #[arg(long)]
        fmt: bool,

        /// Print the cleaned document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the built-in removal rules
    Rules {
        /// Only show the rules of this resource type
        #[arg(short, long)]
        resource_type: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new();

    let config = CleanupConfig::load(&*ctx.fs, cli.config.as_deref())?;
    logging::init(cli.verbose, config.log_level.as_deref());

    match cli.command {
        Commands::Clean {
            files,
            output,
            strict_blocks,
            fmt,
            dry_run,
        } => {
            let options = CleanOptions {
                files,
                output,
                strict_blocks,
                fmt,
                dry_run,
            };
            CleanCommand::execute(&ctx, &config, &options)?;
        }
        Commands::Rules {
            resource_type,
            json,
        } => {
            RulesCommand::execute(&ctx, resource_type.as_deref(), json)?;
        }
    }

    Ok(())
}
