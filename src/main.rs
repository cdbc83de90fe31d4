use clap::Parser;
use qtool::cli::Cli;
use qtool::{orchestrator, Error};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let args = cli.resolve()?;
    match orchestrator::run(args) {
        Ok(_state) => Ok(()),
        Err(err) => {
            tracing::error!(%err, "fatal error");
            std::process::exit(exit_code(&err));
        }
    }
}

fn exit_code(_err: &Error) -> i32 {
    1
}

fn init_tracing(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
