use crate::app::models::{
    Configuration, DEFAULT_AVG_CHARS_PER_TOKEN, DEFAULT_MAX_DEPTH, DEFAULT_OUTPUT_DIR,
    DEFAULT_TOKEN_BUDGET,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

const FLAG_PREFIX: &str = "--";

/// Keys understood by [`parse`], in their canonical spelling.
const KNOWN_KEYS: [&str; 9] = [
    "sln",
    "root",
    "out",
    "budgetTokens",
    "maxDepth",
    "embedFullCode",
    "avgCharsPerToken",
    "msbuildPath",
    "strip",
];

pub const USAGE: &str = r#"Usage:
  code-slicer --sln <path-to-solution.sln> --root <file.cs#MethodName | route:METHOD:/path> [--out ./slice-output] [--budgetTokens 32000] [--maxDepth 20] [--strip true]

Examples:
  code-slicer --sln ~/src/MyApp/MyApp.sln --root "src/Api/Controllers/OrdersController.cs#GetById" --budgetTokens 32000 --out ./slices/orders
  code-slicer --sln ~/src/MyApp/MyApp.sln --root "route:GET:/api/orders/42" --budgetTokens 32000 --out ./slices/orders
  Optional: --msbuildPath "/usr/share/dotnet/sdk/8.0.100"
"#;

/// Collects `--key value` pairs. A flag with no value, or followed by another
/// flag, becomes `"true"`. Keys are lowercased; the last occurrence wins.
fn collect_pairs<I, S>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    let mut pairs = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        if let Some(key) = args[i].strip_prefix(FLAG_PREFIX) {
            let value = match args.get(i + 1) {
                Some(next) if !next.starts_with(FLAG_PREFIX) => {
                    i += 1;
                    next.clone()
                }
                _ => "true".to_string(),
            };
            pairs.insert(key.to_lowercase(), value);
        }
        i += 1;
    }

    pairs
}

/// Parses `key` as a number, keeping `default` when the value is missing,
/// malformed, or rejected by `accept`.
fn numeric_or_default<T>(
    pairs: &HashMap<String, String>,
    key: &str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = pairs.get(&key.to_lowercase()) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => value,
        _ => {
            log::warn!("--{} expects a valid number, got {:?}; using {}", key, raw, default);
            default
        }
    }
}

/// Absent means `true`; present means "equals true, ignoring case".
fn flag_or_true(pairs: &HashMap<String, String>, key: &str) -> bool {
    pairs
        .get(&key.to_lowercase())
        .map_or(true, |v| v.trim().eq_ignore_ascii_case("true"))
}

/// Builds a [`Configuration`] from command-line style tokens.
///
/// Never fails: unknown keys are ignored and malformed numbers fall back to
/// their defaults. Call [`crate::app::config::validate`] afterwards.
pub fn parse<I, S>(args: I) -> Configuration
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pairs = collect_pairs(args);

    for key in pairs.keys() {
        if !KNOWN_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            log::debug!("Ignoring unrecognized option --{}", key);
        }
    }

    let text = |key: &str| pairs.get(&key.to_lowercase()).cloned();

    Configuration {
        solution_path: text("sln").map(PathBuf::from).unwrap_or_default(),
        root_spec: text("root").unwrap_or_default(),
        output_dir: PathBuf::from(text("out").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into())),
        token_budget: numeric_or_default(&pairs, "budgetTokens", DEFAULT_TOKEN_BUDGET, |v| *v > 0),
        max_depth: numeric_or_default(&pairs, "maxDepth", DEFAULT_MAX_DEPTH, |_| true),
        embed_full_code: flag_or_true(&pairs, "embedFullCode"),
        avg_chars_per_token: numeric_or_default(
            &pairs,
            "avgCharsPerToken",
            DEFAULT_AVG_CHARS_PER_TOKEN,
            |v| v.is_finite() && *v > 0.0,
        ),
        msbuild_path: text("msbuildPath").map(PathBuf::from),
        strip_boilerplate: flag_or_true(&pairs, "strip"),
        ..Configuration::default()
    }
}
