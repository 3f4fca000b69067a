use clap::Parser;

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "tidb-monitor",
    about = "Generate Prometheus and Grafana configuration for TiDB clusters on Kubernetes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // stdout carries the rendered document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        commands::Commands::Render(args) => commands::render::execute(args),
        commands::Commands::Dashboard(args) => commands::dashboard::execute(args),
        commands::Commands::Validate(args) => commands::validate::execute(args),
    }
}
