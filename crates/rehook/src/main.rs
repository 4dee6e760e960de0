//! rehook - CLI driver for the class-to-hooks converter.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "rehook")]
#[command(author, version, about = "Convert React class components to hooks")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a file, directory, or stdin to the hooks dialect
    Convert(commands::convert::ConvertArgs),

    /// Validate that input is inside the supported dialect without converting
    Check(commands::check::CheckArgs),

    /// Print the bundled legacy example component
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let use_color = !cli.no_color && !cli.quiet && atty::is(atty::Stream::Stdout);

    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Convert(args) => {
            commands::convert::run(args, cli.format, use_color, cli.quiet)
        }
        Commands::Check(args) => commands::check::run(args, cli.format, use_color),
        Commands::Example => {
            println!("{}", rehook::EXAMPLE_COMPONENT);
            Ok(())
        }
    }
}
