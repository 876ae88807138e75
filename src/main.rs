use std::process;

use quaderno::{
    application::{
        error::AppError,
        site::{SiteBuilder, outline_file},
    },
    config,
    infra::telemetry,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, mut settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Build(config::BuildArgs::default()));

    if let config::Command::Build(args) = &command {
        settings.apply_build_overrides(&args.overrides)?;
    }

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Build(_) => run_build(settings),
        config::Command::Outline(args) => run_outline(&args),
    }
}

fn run_build(settings: config::Settings) -> Result<(), AppError> {
    let report = SiteBuilder::new(settings).build()?;
    info!(
        target: "quaderno",
        posts = report.posts,
        output = %report.output_dir.display(),
        "build finished"
    );
    Ok(())
}

fn run_outline(args: &config::OutlineArgs) -> Result<(), AppError> {
    let outline = outline_file(&args.file)?;
    let json = serde_json::to_string_pretty(&outline)
        .map_err(|err| AppError::unexpected(format!("failed to encode outline: {err}")))?;
    println!("{json}");
    Ok(())
}
