//! Transfer rules and path patterns.

use std::cmp::Reverse;
use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};

use crate::error::{DecouplerError, Result};

/// Name of the pseudo-rule returned when nothing matches.
pub const UNCLASSIFIED: &str = "unclassified";

/// How a source path is turned into target output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Byte-identical copy.
    FullCopy,
    /// Directory skeleton with marker files only.
    StructureOnly,
    /// Files generated from built-in templates.
    Scaffold,
    /// Literal replacements plus placeholder rendering.
    Genericize,
    /// Not transferred.
    Skip,
}

impl Strategy {
    /// Stable identifier used in reports and the manifest.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FullCopy => "full_copy",
            Strategy::StructureOnly => "structure_only",
            Strategy::Scaffold => "scaffold",
            Strategy::Genericize => "genericize",
            Strategy::Skip => "skip",
        }
    }

    /// Declarative strategies produce output once per rule instead of once
    /// per source file.
    pub fn is_declarative(&self) -> bool {
        matches!(self, Strategy::StructureOnly | Strategy::Scaffold)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of pattern, used as the second precedence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PatternKind {
    Exact,
    DirPrefix,
    Glob,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Matches one path exactly.
    Exact(String),
    /// Matches everything below a directory. Stored without the trailing `/`.
    DirPrefix(String),
    /// Matches with a glob. `prefix` is the literal directory part.
    Glob {
        source: String,
        prefix: String,
        matcher: GlobMatcher,
    },
}

fn is_glob_meta(c: char) -> bool {
    matches!(c, '*' | '?' | '[' | ']' | '{' | '}')
}

/// Normalize a configured path fragment: strip `./`, reject `..` and
/// absolute paths.
fn check_relative(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(DecouplerError::ConfigValidationError {
            message: "rule pattern must not be empty".to_string(),
        });
    }
    if pattern.starts_with('/') || pattern.split('/').any(|part| part == "..") {
        return Err(DecouplerError::ConfigValidationError {
            message: format!(
                "rule pattern '{}' must be a relative path without '..'",
                pattern
            ),
        });
    }
    Ok(())
}

impl PathPattern {
    /// Parse a pattern string.
    ///
    /// - `app/` is a directory prefix
    /// - anything containing `* ? [ ] { }` is a glob
    /// - everything else is an exact path
    pub fn parse(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim().trim_start_matches("./");
        check_relative(pattern)?;

        if pattern.contains(is_glob_meta) {
            let matcher = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| DecouplerError::ConfigValidationError {
                    message: format!("invalid glob '{}': {}", pattern, e),
                })?
                .compile_matcher();
            let literal = &pattern[..pattern.find(is_glob_meta).unwrap_or(pattern.len())];
            let prefix = match literal.rfind('/') {
                Some(idx) => literal[..=idx].to_string(),
                None => String::new(),
            };
            return Ok(PathPattern::Glob {
                source: pattern.to_string(),
                prefix,
                matcher,
            });
        }

        match pattern.strip_suffix('/') {
            Some(dir) => {
                check_relative(dir)?;
                Ok(PathPattern::DirPrefix(dir.trim_end_matches('/').to_string()))
            }
            None => Ok(PathPattern::Exact(pattern.to_string())),
        }
    }

    /// The pattern kind.
    pub fn kind(&self) -> PatternKind {
        match self {
            PathPattern::Exact(_) => PatternKind::Exact,
            PathPattern::DirPrefix(_) => PatternKind::DirPrefix,
            PathPattern::Glob { .. } => PatternKind::Glob,
        }
    }

    /// Length of the literal part of the pattern.
    pub fn literal_len(&self) -> usize {
        match self {
            PathPattern::Exact(p) => p.len(),
            PathPattern::DirPrefix(p) => p.len() + 1,
            PathPattern::Glob { prefix, .. } => prefix.len(),
        }
    }

    /// Check whether `path` matches.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == p,
            PathPattern::DirPrefix(dir) => path
                .strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.starts_with('/')),
            PathPattern::Glob { matcher, .. } => matcher.is_match(path),
        }
    }

    /// The directory the pattern names, for declarative rules.
    pub fn directory(&self) -> Option<&str> {
        match self {
            PathPattern::DirPrefix(dir) => Some(dir),
            _ => None,
        }
    }

    /// Portion of `path` below the pattern's literal directory.
    ///
    /// Exact patterns use their parent directory, so the suffix is the file
    /// name.
    pub fn suffix<'p>(&self, path: &'p str) -> &'p str {
        let prefix_len = match self {
            PathPattern::Exact(p) => p.rfind('/').map_or(0, |idx| idx + 1),
            PathPattern::DirPrefix(dir) => dir.len() + 1,
            PathPattern::Glob { prefix, .. } => prefix.len(),
        };
        path.get(prefix_len..).unwrap_or(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(p) => write!(f, "{}", p),
            PathPattern::DirPrefix(p) => write!(f, "{}/", p),
            PathPattern::Glob { source, .. } => write!(f, "{}", source),
        }
    }
}

/// A single entry of the rule table.
#[derive(Debug, Clone)]
pub struct TransferRule {
    /// Unique rule name, used by `--include` and in reports.
    pub name: String,
    /// Compiled path pattern.
    pub pattern: PathPattern,
    /// Strategy applied to matching paths.
    pub strategy: Strategy,
    /// Target path template. `None` keeps the source location.
    pub target: Option<String>,
    /// Scaffold name for [`Strategy::Scaffold`] rules.
    pub scaffold: Option<String>,
    /// Extra subdirectories for [`Strategy::StructureOnly`] rules.
    pub subdirs: Vec<String>,
}

impl TransferRule {
    /// Create a rule with no target template.
    pub fn new(name: impl Into<String>, pattern: &str, strategy: Strategy) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            pattern: PathPattern::parse(pattern)?,
            strategy,
            target: None,
            scaffold: None,
            subdirs: Vec::new(),
        })
    }

    /// Set the target path template.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the scaffold name.
    pub fn with_scaffold(mut self, scaffold: impl Into<String>) -> Self {
        self.scaffold = Some(scaffold.into());
        self
    }

    /// Set the declared subdirectories.
    pub fn with_subdirs<I, S>(mut self, subdirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdirs = subdirs.into_iter().map(Into::into).collect();
        self
    }

    /// The default pseudo-rule for paths nothing else matches.
    pub fn unclassified() -> Self {
        Self {
            name: UNCLASSIFIED.to_string(),
            pattern: PathPattern::Exact(String::new()),
            strategy: Strategy::Skip,
            target: None,
            scaffold: None,
            subdirs: Vec::new(),
        }
    }

    /// Whether this is the default pseudo-rule.
    pub fn is_unclassified(&self) -> bool {
        self.name == UNCLASSIFIED
    }

    /// Precedence key: longest literal prefix, then pattern kind.
    pub(crate) fn precedence(&self) -> (Reverse<usize>, PatternKind) {
        (Reverse(self.pattern.literal_len()), self.pattern.kind())
    }
}
