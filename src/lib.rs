//! Token-lean excerpts of C# sources: run configuration and document minification.

pub mod app;

pub use app::cli::parse;
pub use app::config::validate;
pub use app::errors::ConfigurationError;
pub use app::minifier::minify_document;
pub use app::models::{Configuration, ExclusionMode, RootSpec};
