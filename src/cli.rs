use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::{Context, Result};

use wfmap::config::{CycleHandling, MAX_EXPANSION_DEPTH_LIMIT};
use wfmap::core::call_graph::CrossScopeOutcome;
use wfmap::core::{render_expanded, Engine, MermaidRenderer, ProjectAnalysis, Severity};

#[derive(Parser)]
#[command(name = "wfmap")]
#[command(about = "Call graphs, content identities and pseudocode for XML workflow projects")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse every workflow and summarize the call graph
    Analyze {
        /// Project directory (defaults to current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,

        /// Library project checked for targets the project itself lacks (repeatable)
        #[arg(long = "library")]
        libraries: Vec<PathBuf>,
    },

    /// Print the call graph as a Mermaid flowchart
    Graph {
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Print the expanded pseudocode of one workflow
    Pseudocode {
        /// Workflow path relative to the project root
        path: String,

        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Maximum expansion depth (overrides configuration)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Stop expanding a branch once it hits a cycle
        #[arg(long)]
        stop_on_cycle: bool,

        /// Print the expansion as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the identity string of one workflow
    Identity {
        /// Workflow path relative to the project root
        path: String,

        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Analyze { root, json, libraries } => {
                let analysis = engine.analyze(&project_root(root)).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                } else {
                    print_summary(&analysis);
                }

                if !libraries.is_empty() {
                    let records = engine.resolve_external(&analysis, &libraries).await?;
                    println!("\nLibrary resolution:");
                    for record in records {
                        let outcome = match &record.outcome {
                            CrossScopeOutcome::Resolved { identity, .. } => identity.to_string(),
                            CrossScopeOutcome::Ambiguous { candidates } => {
                                format!("ambiguous ({})", candidates.join(", "))
                            }
                            CrossScopeOutcome::Unresolved => "not found".to_string(),
                        };
                        println!("  {} @ {}: {} -> {}", record.from.logical_path(), record.call_site, record.attempted, outcome);
                    }
                }
                Ok(())
            }
            Commands::Graph { root } => {
                let analysis = engine.analyze(&project_root(root)).await?;
                print!("{}", MermaidRenderer::new().render(&analysis.graph));
                Ok(())
            }
            Commands::Pseudocode { path, root, depth, stop_on_cycle, json } => {
                let analysis = engine.analyze(&project_root(root)).await?;

                let mut config = engine.config().pseudocode;
                if let Some(depth) = depth {
                    anyhow::ensure!(
                        depth <= MAX_EXPANSION_DEPTH_LIMIT,
                        "--depth must be at most {}",
                        MAX_EXPANSION_DEPTH_LIMIT
                    );
                    config.max_depth = depth;
                }
                if stop_on_cycle {
                    config.cycle_handling = CycleHandling::Stop;
                }

                let expanded = analysis.expand_with(&path, config)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&expanded)?);
                } else {
                    print!("{}", render_expanded(&expanded));
                }
                Ok(())
            }
            Commands::Identity { path, root } => {
                let analysis = engine.analyze(&project_root(root)).await?;
                let identity = analysis
                    .identity_of(&path)
                    .with_context(|| format!("No parsed workflow at {}", path))?;
                println!("{}", identity);
                Ok(())
            }
        }
    }
}

fn project_root(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| PathBuf::from("."))
}

fn print_summary(analysis: &ProjectAnalysis) {
    let graph = &analysis.graph;
    let stats = graph.get_statistics();

    println!("Project: {}", analysis.project_id);
    println!("Workflows: {} parsed, {} rejected", stats.total_workflows, analysis.rejected.len());
    println!("Entry points: {}", stats.entry_points);
    for error in &graph.root_errors {
        println!("  unresolved entry point {}: {:?}", error.declared, error.kind);
    }

    println!("Edges: {}", stats.total_edges);
    for (kind, count) in &stats.edges_by_kind {
        println!("  {}: {}", kind.as_str(), count);
    }

    println!("Cycles: {}", graph.cycles.len());
    for (cycle, kind) in graph.cycles.iter().zip(graph.cycle_types()) {
        let members: Vec<&str> = cycle.iter().map(|id| id.logical_path()).collect();
        println!("  {:?}: {}", kind, members.join(" -> "));
    }

    println!("Orphans: {}", graph.orphans.len());
    for orphan in &graph.orphans {
        println!("  {}", orphan.logical_path());
    }

    println!("Max call depth: {}", stats.max_depth);

    let fatal = analysis
        .diagnostics
        .values()
        .flatten()
        .filter(|d| d.severity == Severity::Fatal)
        .count();
    println!("Diagnostics: {} ({} fatal)", analysis.diagnostic_count(), fatal);
    for warning in &graph.warnings {
        println!("  {}", warning);
    }
}
