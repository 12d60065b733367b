// src/core/engine.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Config, ExpansionConfig};
use crate::error::WfmapError;
use super::call_graph::{
    CallGraph, CallGraphBuilder, CrossScopeResolver, ExternalResolution, ExternalScope,
    GraphBuildOutput,
};
use super::context::AnalysisContext;
use super::identity::{normalize_logical_path, Identity};
use super::model::{Diagnostic, ParseOutcome, WorkflowDocument};
use super::parser::StructuralParser;
use super::pseudocode::{expand, ExpandedPseudocode, PseudocodeGenerator, PseudocodeLine};

/// Name of the project manifest read for the project name and entry points
pub const PROJECT_MANIFEST: &str = "project.json";

/// Orchestrates discovery, parsing, graph assembly and pseudocode generation
pub struct Engine {
    config: Config,
}

/// One workflow file as read from disk
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub logical_path: String,
    pub content: String,
}

/// Project name and declared entry points from `project.json`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    pub name: Option<String>,
    pub entry_points: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    name: Option<String>,
    main: Option<String>,
    #[serde(default)]
    entry_points: Vec<RawEntryPoint>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntryPoint {
    file_path: Option<String>,
}

/// Everything produced by one analysis pass over a project directory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub project_id: String,
    pub root: PathBuf,
    pub declared_roots: Vec<String>,
    /// Successfully parsed documents with their resolved invocation lists
    pub documents: Vec<WorkflowDocument>,
    /// Diagnostics per logical path, for parsed and rejected documents alike
    pub diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    /// Documents whose root could not be parsed; not part of the graph
    pub rejected: Vec<String>,
    pub graph: CallGraph,
    #[serde(skip)]
    pub pseudocode: BTreeMap<Identity, Vec<PseudocodeLine>>,
    #[serde(skip)]
    expansion: ExpansionConfig,
}

impl Engine {
    /// Create an engine from a configuration file, or defaults when none exists
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path).context("Failed to load configuration")?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self { config })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full analysis pass over the project rooted at `root`
    pub async fn analyze(&self, root: &Path) -> Result<ProjectAnalysis> {
        let manifest = read_manifest(root)?;
        let project_id = self.project_id(root, &manifest);
        let declared_roots = if manifest.entry_points.is_empty() {
            self.config.project.entry_points.clone()
        } else {
            manifest.entry_points.clone()
        };

        info!("Analyzing {} as project '{}'", root.display(), project_id);

        let context = Arc::new(
            AnalysisContext::new(project_id.clone(), &self.config)
                .context("Invalid analysis configuration")?,
        );

        let sources = self.discover(root, &context)?;
        info!("Discovered {} workflow document(s)", sources.len());

        let outcomes = parse_all(Arc::clone(&context), sources).await?;

        let mut documents = Vec::new();
        let mut diagnostics = BTreeMap::new();
        let mut rejected = Vec::new();
        for outcome in outcomes {
            match outcome {
                ParseOutcome::Parsed { document, diagnostics: found } => {
                    if !found.is_empty() {
                        diagnostics.insert(document.logical_path.clone(), found);
                    }
                    documents.push(document);
                }
                ParseOutcome::Fatal { logical_path, diagnostics: found } => {
                    warn!("Excluding {}: root could not be parsed", logical_path);
                    diagnostics.insert(logical_path.clone(), found);
                    rejected.push(logical_path);
                }
            }
        }

        // Sync point: graph assembly needs every parse result
        let GraphBuildOutput {
            graph,
            mut resolved_invocations,
        } = CallGraphBuilder::new(&context).build(&documents, &declared_roots);
        let documents: Vec<WorkflowDocument> = documents
            .into_iter()
            .map(|document| match resolved_invocations.remove(&document.logical_path) {
                Some(invocations) => WorkflowDocument {
                    invocations,
                    ..document
                },
                None => document,
            })
            .collect();

        let generator = PseudocodeGenerator::new();
        let pseudocode = documents
            .iter()
            .filter_map(|doc| {
                graph
                    .identity_for_path(&doc.logical_path)
                    .map(|identity| (identity.clone(), generator.generate(doc)))
            })
            .collect();

        let stats = graph.get_statistics();
        info!(
            "Call graph: {} workflows, {} edges, {} cycle(s), {} orphan(s)",
            stats.total_workflows, stats.total_edges, stats.cycles, stats.orphans
        );

        Ok(ProjectAnalysis {
            project_id,
            root: root.to_path_buf(),
            declared_roots,
            documents,
            diagnostics,
            rejected,
            graph,
            pseudocode,
            expansion: self.config.pseudocode,
        })
    }

    /// Re-check `missing` edges of `analysis` against library project directories.
    /// Libraries are consulted in the order given.
    pub async fn resolve_external(
        &self,
        analysis: &ProjectAnalysis,
        libraries: &[PathBuf],
    ) -> Result<Vec<ExternalResolution>> {
        let mut scopes = Vec::with_capacity(libraries.len());

        for library in libraries {
            let manifest = read_manifest(library)?;
            let scope_id = self.project_id(library, &manifest);
            let context = Arc::new(
                AnalysisContext::new(scope_id.clone(), &self.config)
                    .context("Invalid analysis configuration")?,
            );

            let sources = self.discover(library, &context)?;
            let documents: Vec<WorkflowDocument> = parse_all(Arc::clone(&context), sources)
                .await?
                .into_iter()
                .filter_map(ParseOutcome::into_document)
                .collect();

            debug!("Library scope '{}': {} document(s)", scope_id, documents.len());
            scopes.push(ExternalScope::new(&scope_id, &documents, &context.identity_resolver()));
        }

        Ok(CrossScopeResolver::new(scopes).resolve(&analysis.graph))
    }

    /// Markup files under `root`, honoring `.gitignore` and the configured excludes
    pub fn discover(&self, root: &Path, context: &AnalysisContext) -> Result<Vec<SourceDocument>> {
        let mut overrides = OverrideBuilder::new(root);
        for pattern in &self.config.project.exclude {
            overrides
                .add(&format!("!{}", pattern))
                .with_context(|| format!("Invalid exclude pattern '{}'", pattern))?;
        }
        let overrides = overrides.build().context("Failed to build exclude patterns")?;

        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .build();

        let mut sources = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| WfmapError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            let logical_path = normalize_logical_path(&relative.to_string_lossy());
            if !context.is_markup_path(&logical_path) {
                continue;
            }

            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    warn!("{} is not valid UTF-8", logical_path);
                    // Handed to the parser anyway so it is reported as fatal
                    String::new()
                }
            };

            sources.push(SourceDocument {
                logical_path,
                content: content.trim_start_matches('\u{feff}').to_string(),
            });
        }

        sources.sort_by(|a, b| a.logical_path.cmp(&b.logical_path));
        Ok(sources)
    }

    /// Configured id, else a slug of the manifest name, else of the directory name
    fn project_id(&self, root: &Path, manifest: &ProjectManifest) -> String {
        if let Some(id) = &self.config.project.id {
            return id.clone();
        }

        let name = manifest.name.clone().or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        });

        match name.map(|n| slugify(&n)) {
            Some(slug) if !slug.is_empty() => slug,
            _ => "project".to_string(),
        }
    }
}

impl ProjectAnalysis {
    pub fn document(&self, logical_path: &str) -> Option<&WorkflowDocument> {
        let normalized = normalize_logical_path(logical_path);
        self.documents.iter().find(|doc| doc.logical_path == normalized)
    }

    pub fn identity_of(&self, logical_path: &str) -> Option<&Identity> {
        self.graph.identity_for_path(&normalize_logical_path(logical_path))
    }

    /// Expanded pseudocode of one document, using the configured bounds
    pub fn expand(&self, logical_path: &str) -> Result<ExpandedPseudocode> {
        self.expand_with(logical_path, self.expansion)
    }

    pub fn expand_with(&self, logical_path: &str, config: ExpansionConfig) -> Result<ExpandedPseudocode> {
        config.validate()?;
        let identity = self
            .identity_of(logical_path)
            .with_context(|| format!("No parsed workflow at {}", logical_path))?;
        let base = self
            .pseudocode
            .get(identity)
            .with_context(|| format!("No pseudocode for {}", identity))?;

        Ok(expand(identity, base, &self.graph, &self.pseudocode, config)?)
    }

    pub fn diagnostic_count(&self) -> usize {
        self.diagnostics.values().map(Vec::len).sum()
    }
}

/// Parse every source on the blocking pool and collect outcomes in input order
async fn parse_all(context: Arc<AnalysisContext>, sources: Vec<SourceDocument>) -> Result<Vec<ParseOutcome>> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let context = Arc::clone(&context);
            tokio::task::spawn_blocking(move || {
                StructuralParser::new(&context).parse(&source.logical_path, &source.content)
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.context("Parser task failed")?);
    }
    Ok(outcomes)
}

/// Read `project.json` from `root`; an absent manifest is not an error
pub fn read_manifest(root: &Path) -> Result<ProjectManifest> {
    let path = root.join(PROJECT_MANIFEST);
    if !path.exists() {
        return Ok(ProjectManifest::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: RawManifest = serde_json::from_str(content.trim_start_matches('\u{feff}'))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut entry_points: Vec<String> = Vec::new();
    let declared = raw
        .main
        .into_iter()
        .chain(raw.entry_points.into_iter().filter_map(|e| e.file_path));
    for entry in declared {
        let entry = normalize_logical_path(&entry);
        if !entry.is_empty() && !entry_points.contains(&entry) {
            entry_points.push(entry);
        }
    }

    Ok(ProjectManifest {
        name: raw.name,
        entry_points,
    })
}

/// Lower-case, alphanumeric runs joined by single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
