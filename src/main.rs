use std::process::ExitCode;

use ca_migrate::cli::{Arguments, ExitStatus, init_logging, report::print_error, run_cli};
use clap::Parser;

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.debug());

    match run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            print_error(&err);
            ExitStatus::from_error(&err).into()
        }
    }
}
