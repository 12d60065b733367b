use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, WfmapError};

/// Largest expansion depth accepted from configuration
pub const MAX_EXPANSION_DEPTH_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Project identity and entry points
    pub project: ProjectConfig,

    /// Structural parser settings
    pub parser: ParserConfig,

    /// Pseudocode expansion settings
    pub pseudocode: ExpansionConfig,

    /// Content identity settings
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project identifier; derived from the project directory when absent
    pub id: Option<String>,

    /// Declared entry points, relative to the project root
    pub entry_points: Vec<String>,

    /// Glob patterns excluded from discovery
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum element nesting before a subtree is skipped
    pub max_depth: usize,

    /// Extra tags always treated as structural
    pub custom_blacklist: Vec<String>,

    /// Extra tags always treated as visual activities
    pub custom_whitelist: Vec<String>,

    /// Extensions of workflow markup documents
    pub markup_extensions: Vec<String>,

    /// Extensions of executable units that are invoked but never parsed
    pub external_extensions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CycleHandling {
    /// Emit a cycle marker and keep expanding the rest of the branch
    #[default]
    Mark,
    /// Emit a cycle marker and stop expanding the branch that hit it
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub max_depth: usize,
    pub cycle_handling: CycleHandling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Number of hex characters of the content hash kept in identities
    pub hash_prefix_len: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            id: None,
            entry_points: vec!["Main.xaml".to_string()],
            exclude: vec![
                ".local/**".to_string(),
                ".objects/**".to_string(),
                ".settings/**".to_string(),
                ".tmh/**".to_string(),
            ],
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            custom_blacklist: Vec::new(),
            custom_whitelist: Vec::new(),
            markup_extensions: vec!["xaml".to_string()],
            external_extensions: vec!["cs".to_string()],
        }
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            cycle_handling: CycleHandling::Mark,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { hash_prefix_len: 16 }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| WfmapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| WfmapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["wfmap.toml", ".wfmap.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.pseudocode.validate()?;
        self.identity.validate()?;
        if self.parser.max_depth == 0 {
            return Err(WfmapError::InvalidConfig {
                field: "parser.max_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl ExpansionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth > MAX_EXPANSION_DEPTH_LIMIT {
            return Err(WfmapError::InvalidConfig {
                field: "pseudocode.max_depth".to_string(),
                reason: format!("must be <= {}", MAX_EXPANSION_DEPTH_LIMIT),
            });
        }
        Ok(())
    }
}

impl IdentityConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8..=64).contains(&self.hash_prefix_len) {
            return Err(WfmapError::InvalidConfig {
                field: "identity.hash_prefix_len".to_string(),
                reason: "must be between 8 and 64".to_string(),
            });
        }
        Ok(())
    }
}
