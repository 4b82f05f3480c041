use clap::Parser;
use envpipe::cli::{Cli, Commands, demo_command, run_command};
use envpipe::config::constants;
use envpipe::logging;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = constants::init_constants() {
        eprintln!("Failed to resolve executable path: {e}");
        std::process::exit(1);
    }

    let args = Cli::parse();

    let log_file = match logging::create_log_file(&args.cmd.run_name()) {
        Ok((file, path)) => {
            eprintln!("Log file created: {}", path.display());
            file
        }
        Err(e) => {
            eprintln!("Failed to create log file: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                ),
        )
        .with(
            fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_filter(EnvFilter::new("debug")),
        )
        .init();

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let summary = match args.cmd {
        Commands::Run {
            input,
            config,
            sink,
        } => run_command(input, config, sink).await?,
        Commands::Demo { sink } => demo_command(sink).await?,
    };
    info!("Delivered {} envelopes", summary.envelopes);
    Ok(())
}
