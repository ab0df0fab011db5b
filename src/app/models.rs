use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "./slice-output";
pub const DEFAULT_TOKEN_BUDGET: u32 = 32_000;
pub const DEFAULT_MAX_DEPTH: u32 = 20;
pub const DEFAULT_AVG_CHARS_PER_TOKEN: f64 = 4.0;

/// Built-in exclusion regexes, matched against file paths with either separator.
pub fn default_exclusions() -> Vec<String> {
    [
        // Folders
        r"[\\/](bin|obj)[\\/]",
        r"[\\/]Migrations[\\/]",
        r"[\\/]Test(s)?[\\/]",
        r"[\\/.]Tests?[\\/]",
        // Generated files
        r"\.g\.cs$",
        r"\.g\.i\.cs$",
        r"\.designer\.cs$",
        r"\.generated\.cs$",
        r"AssemblyInfo\.cs$",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

/// How caller-supplied exclusion patterns combine with the built-in list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionMode {
    #[default]
    Append,
    Replace,
}

/// Starting point of a slice, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSpec {
    /// `path/to/File.cs#Member`, member optional.
    FileMember {
        path: String,
        member: Option<String>,
    },
    /// `route:GET:/api/orders/{id}`
    Route { method: String, template: String },
}

impl RootSpec {
    const ROUTE_PREFIX: &'static str = "route:";

    /// Never fails; grammar checks belong to whoever resolves the root.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let is_route = raw
            .get(..Self::ROUTE_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(Self::ROUTE_PREFIX));

        if is_route {
            let rest = &raw[Self::ROUTE_PREFIX.len()..];
            let (method, template) = rest.split_once(':').unwrap_or((rest, ""));
            return RootSpec::Route {
                method: method.trim().to_string(),
                template: template.trim().to_string(),
            };
        }

        let (path, member) = match raw.split_once('#') {
            Some((path, member)) => {
                let member = member.trim();
                (path, (!member.is_empty()).then(|| member.to_string()))
            }
            None => (raw, None),
        };
        RootSpec::FileMember {
            path: path.trim().to_string(),
            member,
        }
    }
}

/// Fully-typed parameters of one slice run. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) solution_path: PathBuf,
    pub(crate) root_spec: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) token_budget: u32,
    pub(crate) max_depth: u32,
    pub(crate) embed_full_code: bool,
    pub(crate) avg_chars_per_token: f64,
    pub(crate) msbuild_path: Option<PathBuf>,
    pub(crate) strip_boilerplate: bool,
    pub(crate) exclude_patterns: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            solution_path: PathBuf::new(),
            root_spec: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            token_budget: DEFAULT_TOKEN_BUDGET,
            max_depth: DEFAULT_MAX_DEPTH,
            embed_full_code: true,
            avg_chars_per_token: DEFAULT_AVG_CHARS_PER_TOKEN,
            msbuild_path: None,
            strip_boilerplate: true,
            exclude_patterns: default_exclusions(),
        }
    }
}

impl Configuration {
    pub fn solution_path(&self) -> &std::path::Path {
        &self.solution_path
    }

    pub fn root_spec(&self) -> &str {
        &self.root_spec
    }

    pub fn root(&self) -> RootSpec {
        RootSpec::parse(&self.root_spec)
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    pub fn token_budget(&self) -> u32 {
        self.token_budget
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn embed_full_code(&self) -> bool {
        self.embed_full_code
    }

    pub fn avg_chars_per_token(&self) -> f64 {
        self.avg_chars_per_token
    }

    pub fn msbuild_path(&self) -> Option<&std::path::Path> {
        self.msbuild_path.as_deref()
    }

    pub fn strip_boilerplate(&self) -> bool {
        self.strip_boilerplate
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Returns a copy whose exclusion list is `patterns` appended to, or replacing,
    /// the current list. Appending skips patterns already present.
    pub fn with_exclusions<I, S>(mut self, patterns: I, mode: ExclusionMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns.into_iter().map(Into::into);
        match mode {
            ExclusionMode::Replace => self.exclude_patterns = patterns.collect(),
            ExclusionMode::Append => {
                for pattern in patterns {
                    if !self.exclude_patterns.contains(&pattern) {
                        self.exclude_patterns.push(pattern);
                    }
                }
            }
        }
        self
    }
}

/// A source file found under the solution directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub relative_path: String,
}
