//! labmig - schema migrations for the lab information system database

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, GlobalArgs};
use commands::common::{exit_code_for, ExitCode};
use commands::{migrate, new, status, verify};

/// Install the logger: `info` by default, `debug` with `--verbose`.
/// `RUST_LOG` takes precedence over both.
fn init_logging(global: &GlobalArgs) {
    let default_level = if global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let result = match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::Verify => verify::execute(&cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            if err.downcast_ref::<ExitCode>().is_none() {
                eprintln!("Error: {err:#}");
            }
            let code = exit_code_for(&err);
            std::process::ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
