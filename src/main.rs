use clap::Parser;
use std::process::ExitCode;
use visual_templates::cli::{self, Args};
use visual_templates::core::{AppError, DefaultErrorReporter, ErrorReporter};
use visual_templates::logging::{self, LoggingConfig};

fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match init_logging(&args) {
        Ok(guard) => guard,
        Err(error) => return report_failure(error),
    };

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_failure(error),
    }
}

fn init_logging(args: &Args) -> visual_templates::Result<logging::LoggingGuard> {
    let base_dir = std::env::current_dir()?;
    let config = LoggingConfig::load(args.config.as_deref(), &base_dir)?;
    logging::init(&config, &base_dir)
}

fn report_failure(error: anyhow::Error) -> ExitCode {
    tracing::debug!("command failed: {:#}", error);
    match error.downcast_ref::<AppError>() {
        Some(app_error) => DefaultErrorReporter::new().report_error(app_error),
        None => eprintln!("Error: {:#}", error),
    }
    ExitCode::FAILURE
}
