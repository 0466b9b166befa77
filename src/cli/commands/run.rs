use anyhow::Result;
use log::info;

use super::super::args::RunCommand;
use super::super::credentials::PromptingProvider;
use super::super::exit_status::ExitStatus;
use super::super::report::print_summary;
use crate::api::{ClientOptions, QualysClient};
use crate::config::load_config;
use crate::migration::{JsonFileSink, Migration};

pub fn run(cmd: RunCommand) -> Result<ExitStatus> {
    let checked = cmd.check()?;

    let config = load_config(checked.config_file)?;

    let options = ClientOptions {
        proxy_url: cmd.proxy().map(str::to_string),
        ..ClientOptions::default()
    };
    let source = QualysClient::connect(
        config.source_api_url(),
        &mut PromptingProvider::new("source", checked.source_user, checked.source_password),
        &options,
    )?;
    let target = QualysClient::connect(
        config.target_api_url(),
        &mut PromptingProvider::new("target", checked.target_user, checked.target_password),
        &options,
    )?;

    let mut sink = JsonFileSink::new(&cmd.output_dir);
    let report = Migration::new(&source, &target)
        .validate_keys(cmd.validate_activation_keys)
        .run(&config, &mut sink)?;
    info!("Wrote {} file(s)", sink.written().len());

    print_summary(&report, sink.dir());
    Ok(ExitStatus::Success)
}
