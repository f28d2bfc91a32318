use std::process;

use postboard::config;
use postboard::telemetry;
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

mod commands;

use commands::CommandError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &CommandError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "command failed");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "command failed");
    });
}

async fn run() -> Result<(), CommandError> {
    use clap::Parser;

    let cli = config::CliArgs::parse();
    let settings = config::load(&cli)?;
    telemetry::init(&settings.logging)?;

    commands::run(&settings, cli.command).await
}
