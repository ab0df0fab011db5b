// Declare modules
pub mod cli;
pub mod config;
pub mod document;
pub mod errors;
pub mod formatter;
pub mod minifier;
pub mod models;
pub mod scanner;
pub mod syntax;

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use self::config::{resolve_config, validate};
use self::document::{DocumentProvider, WorkspaceDocuments};
use self::formatter::estimate_tokens;
use self::minifier::minify_document;
use self::models::{Configuration, RootSpec};
use self::scanner::Scanner;

/// Directory holding the solution file; `.` for a bare file name.
fn solution_dir(config: &Configuration) -> PathBuf {
    match config.solution_path().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Root files are looked up next to the solution first, then from the working directory.
fn locate_root_file(solution_dir: &Path, path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    [solution_dir.join(path), path.to_path_buf()]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Parses and validates the configuration, then prints the minified root document.
pub async fn run() -> Result<()> {
    // 1. Parse Args
    let config = cli::parse(env::args().skip(1));

    // 2. Apply exclusion presets
    let config = resolve_config(config)?;

    // 3. Validate
    if let Err(err) = validate(&config) {
        eprintln!("{}", cli::USAGE);
        return Err(err.into());
    }

    log::info!(
        "Slicing {:?} from {:?} into {:?} (budget {} tokens, depth {}, strip {}, full code {})",
        config.solution_path(),
        config.root_spec(),
        config.output_dir(),
        config.token_budget(),
        config.max_depth(),
        config.strip_boilerplate(),
        config.embed_full_code()
    );
    if let Some(msbuild) = config.msbuild_path() {
        log::debug!("MSBuild location hint: {:?}", msbuild);
    }

    // 4. Enumerate candidate documents
    let root_dir = solution_dir(&config);
    let scanner = Scanner::new(root_dir.clone(), &config)?;
    let entries = scanner.scan();
    log::info!(
        "{} candidate source document(s) under {:?}",
        entries.len(),
        root_dir
    );

    // 5. Minify the root document
    let (path, member) = match config.root() {
        RootSpec::Route { method, template } => {
            log::info!(
                "Route root {} {} is resolved during graph traversal; nothing to print",
                method,
                template
            );
            return Ok(());
        }
        RootSpec::FileMember { path, member } => (path, member),
    };

    let file = locate_root_file(&root_dir, &path)
        .with_context(|| format!("Root file {:?} not found", path))?;
    if scanner.is_excluded(&file) {
        log::warn!("Root file {:?} matches an exclusion pattern", file);
    }
    if let Some(member) = member {
        log::debug!("Member {:?} is located during root resolution", member);
    }

    let provider = WorkspaceDocuments::new(root_dir);
    let document = provider.open(&file).await?;
    let strip = config.strip_boilerplate();
    let text = minify_document(document.as_ref(), strip, strip).await;

    // 6. Print to Stdout
    print!("{}", text);
    eprintln!(
        "~{} tokens of {} budget",
        estimate_tokens(&text, config.avg_chars_per_token()),
        config.token_budget()
    );

    Ok(())
}
