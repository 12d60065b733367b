//! wfmap: structural analysis of XML workflow projects.
//!
//! Parses workflow documents tolerantly, gives each a content-addressed
//! [`Identity`](core::Identity), resolves cross-document invocations into a
//! cycle-aware multi-root [`CallGraph`](core::CallGraph), and renders
//! recursively expanded pseudocode for any workflow.

pub mod config;
pub mod core;
pub mod error;

pub use config::Config;
pub use error::{Result, WfmapError};
