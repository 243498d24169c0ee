//! diagram subcommands - route, layer and usage diagrams

use clap::Subcommand;
use inspect::{CodeInspector, FactsFileInspector};
use mermaid::{DiagramAssembler, DiagramConfig, GraphText};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum DiagramCommands {
    /// Generate both route and layer diagrams as HTML
    Generate {
        /// Facts file (JSON)
        facts: PathBuf,
        /// Base package (default: $ARCHGRAPH_BASE_PACKAGE)
        #[arg(short, long)]
        base_package: Option<String>,
        /// Output directory (default: $ARCHGRAPH_OUTPUT_DIR or ./docs)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Generate the HTTP route diagram
    Routes {
        /// Facts file (JSON)
        facts: PathBuf,
        /// Base package
        #[arg(short, long)]
        base_package: Option<String>,
        /// Output HTML file (default: print Mermaid text)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate the package layer diagram
    Layers {
        /// Facts file (JSON)
        facts: PathBuf,
        /// Base package
        #[arg(short, long)]
        base_package: Option<String>,
        /// Output HTML file (default: print Mermaid text)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate the usage tree of one symbol
    Usages {
        /// Facts file (JSON)
        facts: PathBuf,
        /// Fully-qualified root symbol
        root: String,
        /// Base package
        #[arg(short, long)]
        base_package: Option<String>,
        /// Max depth
        #[arg(short, long, default_value = "3")]
        depth: usize,
        /// Output HTML file (default: print Mermaid text)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(cmd: DiagramCommands) -> anyhow::Result<()> {
    match cmd {
        DiagramCommands::Generate { facts, base_package, output_dir } => {
            cmd_generate(facts, base_package, output_dir).await
        }
        DiagramCommands::Routes { facts, base_package, output } => {
            cmd_routes(facts, base_package, output).await
        }
        DiagramCommands::Layers { facts, base_package, output } => {
            cmd_layers(facts, base_package, output).await
        }
        DiagramCommands::Usages { facts, root, base_package, depth, output } => {
            cmd_usages(facts, &root, base_package, depth, output).await
        }
    }
}

/// Environment config with command-line overrides applied
fn load_config(base_package: Option<String>, output_dir: Option<PathBuf>) -> DiagramConfig {
    let mut config = DiagramConfig::from_env();
    if let Some(base_package) = base_package {
        config = config.with_base_package(base_package);
    }
    if let Some(output_dir) = output_dir {
        config = config.with_output_dir(output_dir);
    }
    config
}

async fn cmd_generate(
    facts: PathBuf,
    base_package: Option<String>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(base_package, output_dir);
    let mut inspector = FactsFileInspector::new(&facts);

    for path in mermaid::generate(&mut inspector, &config).await? {
        println!("saved {}", path.display());
    }

    Ok(())
}

async fn cmd_routes(
    facts: PathBuf,
    base_package: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(base_package, None);
    let mut inspector = FactsFileInspector::new(&facts);

    let routes = inspector.scan_routes(&config.base_package).await?;
    let graph = DiagramAssembler::route_graph(&routes);

    emit(&graph, output)
}

async fn cmd_layers(
    facts: PathBuf,
    base_package: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(base_package, None);
    let mut inspector = FactsFileInspector::new(&facts);

    let usages = inspector.scan_usages(&config.base_package).await?;
    let graph = DiagramAssembler::new(config.base_package.as_str()).layer_graph(&usages);

    emit(&graph, output)
}

async fn cmd_usages(
    facts: PathBuf,
    root: &str,
    base_package: Option<String>,
    depth: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = load_config(base_package, None);
    let mut inspector = FactsFileInspector::new(&facts);

    let usages = inspector.scan_usages(&config.base_package).await?;
    if !usages.contains_key(root) {
        tracing::warn!("{} uses nothing inside '{}'", root, config.base_package);
    }
    let graph = DiagramAssembler::usage_tree(root, depth, &usages);

    emit(&graph, output)
}

/// Save as HTML when an output file is given, otherwise print the Mermaid text
fn emit(graph: &GraphText, output: Option<PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(file) => {
            let path = graph.save(file)?;
            println!("saved {}", path.display());
        }
        None => {
            println!("{}", graph.render());
        }
    }

    Ok(())
}
