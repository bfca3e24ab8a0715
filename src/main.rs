use cs_testgen::cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();
    init_logging(command_line_interface.verbosity());
    command_line_interface.run().await
}

fn init_logging(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "cs_testgen=info",
        1 => "cs_testgen=debug",
        _ => "cs_testgen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
