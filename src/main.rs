//! archgraph - Mermaid route and layer diagrams from code inspection facts

mod diagram_cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "archgraph")]
#[command(about = "Mermaid route and layer diagrams from code inspection facts", version)]
struct Cli {
    #[command(subcommand)]
    command: diagram_cli::DiagramCommands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries diagram text and "saved" lines
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    diagram_cli::run(cli.command).await
}
