use std::{io::Write as _, process::ExitCode};

use anyhow::Context as _;
use lottie2gif::{Invocation, parse_args, run};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let (config, inputs) = match parse_args(std::env::args_os()) {
        Ok(Invocation::Convert { config, inputs }) => (config, inputs),
        Ok(Invocation::Usage(text)) => {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{text}")
                .and_then(|()| stdout.flush())
                .context("failed to print usage")?;
            return Ok(ExitCode::SUCCESS);
        }
        // Help and version exit 0; malformed options exit 2.
        Err(err) => err.exit(),
    };

    let report = run(&config, &inputs);
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
