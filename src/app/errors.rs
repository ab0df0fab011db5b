use std::path::PathBuf;
use thiserror::Error;

/// Reasons a configuration is rejected before any traversal starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing or invalid --sln <path-to-solution.sln> (got {path:?}).")]
    MissingOrInvalidSolution { path: PathBuf },

    #[error("Missing --root. Use \"path/to/File.cs#MethodName\" or \"route:GET:/path\".")]
    MissingRootSpecification,
}
