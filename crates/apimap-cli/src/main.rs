use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use apimap_analysis::{AnalysisRequest, RestAnalyzer};

/// Discover the REST surface of compiled Java artifacts and print it as
/// JSON.
#[derive(Debug, Parser)]
#[command(name = "apimap", version)]
struct Args {
    /// Class directory or archive scanned for REST resources. Repeatable.
    #[arg(long = "class-path", required = true)]
    class_paths: Vec<PathBuf>,

    /// Source directory for documentation enrichment. Repeatable.
    #[arg(long = "source-path")]
    source_paths: Vec<PathBuf>,

    /// Class directory or archive used for supertype lookups only.
    /// Repeatable.
    #[arg(long = "dependency-path")]
    dependency_paths: Vec<PathBuf>,

    /// Do not register the host JDK (`$JAVA_HOME`) as a dependency.
    #[arg(long)]
    no_platform_classpath: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut analyzer = RestAnalyzer::new();
    if args.no_platform_classpath {
        analyzer = analyzer.without_platform_classpath();
    }

    let request = AnalysisRequest {
        project_class_paths: args.class_paths,
        project_source_paths: args.source_paths,
        dependency_class_paths: args.dependency_paths,
    };
    let resources = analyzer.analyze(&request).context("analysis failed")?;

    let json = serde_json::to_string_pretty(&resources)?;
    println!("{json}");
    Ok(())
}
