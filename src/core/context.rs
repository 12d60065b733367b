// src/core/context.rs
use crate::config::{Config, ExpansionConfig, IdentityConfig, ParserConfig};
use crate::core::classifier::Classifier;
use crate::core::identity::IdentityResolver;
use crate::error::Result;

/// Everything one analysis pass needs, passed explicitly into each call.
///
/// Immutable once built and safe to share across worker threads.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub project_id: String,
    pub parser: ParserConfig,
    pub identity: IdentityConfig,
    pub expansion: ExpansionConfig,
    classifier: Classifier,
}

impl AnalysisContext {
    pub fn new(project_id: impl Into<String>, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            project_id: project_id.into(),
            classifier: Classifier::new(&config.parser)?,
            parser: config.parser.clone(),
            identity: config.identity,
            expansion: config.pseudocode,
        })
    }

    /// Context with default settings, mostly for tests and embedding
    pub fn with_defaults(project_id: impl Into<String>) -> Result<Self> {
        Self::new(project_id, &Config::default())
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn identity_resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.identity)
    }

    /// Whether a discovered file is a workflow document to parse
    pub fn is_markup_path(&self, path: &str) -> bool {
        has_extension(path, &self.parser.markup_extensions)
    }
}

fn has_extension(path: &str, extensions: &[String]) -> bool {
    let file_name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((_, ext)) => extensions
            .iter()
            .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_path_detection() {
        let context = AnalysisContext::with_defaults("demo").unwrap();
        assert!(context.is_markup_path("Flows/Main.xaml"));
        assert!(context.is_markup_path("Flows\\Main.XAML"));
        assert!(!context.is_markup_path("Coded/Helper.cs"));
        assert!(!context.is_markup_path("README"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.pseudocode.max_depth = 99;
        assert!(AnalysisContext::new("demo", &config).is_err());
    }
}
