//! `dotlink` binary: parse arguments, set up logging, and dispatch.
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dotlink_cli::{cli, commands, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();

    let args = match cli::Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let command = args.command_name();
    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(logging::Logger::new(command));

    let result = match &args.command {
        cli::Command::List(opts) => {
            commands::list::run(&args.global, opts, log.as_ref(), &mut std::io::stdout().lock())
        }
        cli::Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        cli::Command::Uninstall(opts) => commands::uninstall::run(&args.global, opts, &log),
        cli::Command::Version => commands::version::run(&mut std::io::stdout().lock()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
